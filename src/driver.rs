//! Top-level entry point: selects the structured walker when a
//! `/StructTreeRoot` is present, otherwise falls back to the geometric
//! reconstructor.

use crate::font_cache::FontCache;
use crate::geometric::GeometricReconstructor;
use crate::interpreter::{Interpreter, Mode};
use crate::object_graph::{deref, deref_dict, Dict, ObjectGraph};
use crate::structured::{Limits, StructuredWalker};
use crate::table::Table;

/// Run extraction with a fresh, isolated [`FontCache`] that is cleared
/// before returning. This is the entry point almost every caller wants.
pub fn search_tables<G: ObjectGraph>(graph: &G) -> Vec<Table> {
    search_tables_with_limits(graph, Limits::default())
}

/// Same as [`search_tables`], but with a caller-supplied recursion-depth
/// guard (§2a) for documents whose structure tree is unusually deep or
/// suspected to cycle.
pub fn search_tables_with_limits<G: ObjectGraph>(graph: &G, limits: Limits) -> Vec<Table> {
    let mut cache = FontCache::new();
    let tables = search_tables_with_cache_and_limits(graph, &mut cache, limits);
    cache.clear();
    tables
}

/// Same as [`search_tables`], but with caller-controlled font-cache
/// lifetime — useful for pooling across many documents, as long as the
/// caller clears it between them.
pub fn search_tables_with_cache<G: ObjectGraph>(graph: &G, cache: &mut FontCache) -> Vec<Table> {
    search_tables_with_cache_and_limits(graph, cache, Limits::default())
}

/// The fully general entry point: caller-owned font-cache lifetime and a
/// caller-supplied `Limits`. The other `search_tables*` functions are thin
/// defaults over this one.
pub fn search_tables_with_cache_and_limits<G: ObjectGraph>(
    graph: &G,
    cache: &mut FontCache,
    limits: Limits,
) -> Vec<Table> {
    tracing::debug!("search_tables: starting extraction run");
    match struct_tree_root(graph) {
        Some(root) => {
            let mut walker = StructuredWalker::new(graph, cache).with_limits(limits);
            walker
                .search(&root)
                .into_iter()
                .map(Table::Structured)
                .collect()
        }
        None => geometric_search(graph, cache).into_iter().map(Table::Geometric).collect(),
    }
}

fn struct_tree_root<G: ObjectGraph>(graph: &G) -> Option<Dict> {
    let catalog = graph.catalog()?;
    let entry = catalog.get("StructTreeRoot")?;
    deref_dict(graph, entry)
}

fn geometric_search<G: ObjectGraph>(
    graph: &G,
    cache: &mut FontCache,
) -> Vec<crate::geometric::GeoTable> {
    let mut reconstructor = GeometricReconstructor::new();
    for page in graph.pages() {
        let font_set = cache.process_fonts(page.id, &page.dict, graph).clone();
        let Some(contents) = page.dict.get("Contents") else {
            continue;
        };
        let resolved = deref(graph, contents);
        let ops = graph.content_ops(&resolved);
        let mut interp = Interpreter::new(Mode::Hex, &font_set);
        for event in interp.run(ops) {
            reconstructor.ingest(&event);
        }
    }
    reconstructor.into_tables()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Operand;
    use crate::object_graph::{ContentOp, Object, ObjId, PageRef};
    use std::cell::RefCell;
    use std::collections::HashMap;

    struct FakeGraph {
        objects: RefCell<HashMap<ObjId, Object>>,
        catalog: Option<Dict>,
        pages: Vec<PageRef>,
    }

    impl ObjectGraph for FakeGraph {
        fn get_object(&self, id: ObjId) -> Option<Object> {
            self.objects.borrow().get(&id).cloned()
        }
        fn catalog(&self) -> Option<Dict> {
            self.catalog.clone()
        }
        fn pages(&self) -> Vec<PageRef> {
            self.pages.clone()
        }
        fn content_ops(&self, contents: &Object) -> Vec<ContentOp> {
            let Object::Stream(_, raw) = contents else {
                return Vec::new();
            };
            if raw == b"GEOMPAGE" {
                vec![
                    ContentOp {
                        operator: "re".to_string(),
                        operands: vec![
                            Operand::Number(0.0),
                            Operand::Number(0.0),
                            Operand::Number(100.0),
                            Operand::Number(50.0),
                        ],
                    },
                    ContentOp {
                        operator: "Td".to_string(),
                        operands: vec![Operand::Number(5.0), Operand::Number(10.0)],
                    },
                    ContentOp {
                        operator: "Tj".to_string(),
                        operands: vec![Operand::Text("already decoded".into())],
                    },
                ]
            } else {
                Vec::new()
            }
        }
    }

    #[test]
    fn falls_back_to_geometric_when_no_struct_tree_root() {
        let mut page = Dict::new();
        page.insert("Contents", Object::Stream(Dict::new(), b"GEOMPAGE".to_vec()));
        let graph = FakeGraph {
            objects: RefCell::new(HashMap::new()),
            catalog: Some(Dict::new()),
            pages: vec![PageRef { id: (1, 0), dict: page }],
        };

        // "already decoded" arrives as a Text operand under Hex mode with no
        // active CMap, so it decodes to the empty string per 4.D and the
        // resulting TextEvent is never ingested into a table.
        let tables = search_tables(&graph);
        assert!(tables.is_empty());
    }

    #[test]
    fn search_tables_with_limits_is_exposed_from_the_driver() {
        let graph = FakeGraph {
            objects: RefCell::new(HashMap::new()),
            catalog: None,
            pages: Vec::new(),
        };
        assert!(search_tables_with_limits(&graph, crate::structured::Limits::default()).is_empty());
    }

    #[test]
    fn returns_empty_when_catalog_and_pages_are_both_absent() {
        let graph = FakeGraph {
            objects: RefCell::new(HashMap::new()),
            catalog: None,
            pages: Vec::new(),
        };
        assert!(search_tables(&graph).is_empty());
    }
}
