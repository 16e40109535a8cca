//! Per-page `{font-name → CMap}` memoization (4.C), re-architected from the
//! original's process-wide singleton into an explicit owner passed through
//! one extraction run (Design Notes §9).

use std::collections::HashMap;

use crate::cmap::{parse_cmap, CMap};
use crate::object_graph::{deref, deref_dict, Dict, Object, ObjId, ObjectGraph};

/// Ordered mapping from font-resource-name to CMap, scoped to one page.
/// Order matters only in that it reflects `Resources/Font` dictionary
/// order; lookups are by name.
pub type FontSet = Vec<(String, CMap)>;

pub fn find_cmap<'a>(font_set: &'a FontSet, name: &str) -> Option<&'a CMap> {
    font_set
        .iter()
        .find(|(font_name, _)| font_name == name)
        .map(|(_, cmap)| cmap)
}

/// Owns every page's FontSet for the lifetime of one extraction run.
#[derive(Debug, Default)]
pub struct FontCache {
    sets: HashMap<ObjId, FontSet>,
}

impl FontCache {
    pub fn new() -> Self {
        FontCache {
            sets: HashMap::new(),
        }
    }

    /// Activate (building if necessary) the FontSet for `page_id`.
    pub fn process_fonts<G: ObjectGraph + ?Sized>(
        &mut self,
        page_id: ObjId,
        page: &Dict,
        graph: &G,
    ) -> &FontSet {
        if !self.sets.contains_key(&page_id) {
            let set = build_font_set(page, graph);
            tracing::debug!(page = ?page_id, fonts = set.len(), "font-cache: built font set for page");
            self.sets.insert(page_id, set);
        }
        self.sets.get(&page_id).expect("just inserted")
    }

    /// Drop every cached FontSet, ending this run's lifetime.
    pub fn clear(&mut self) {
        self.sets.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

fn build_font_set<G: ObjectGraph + ?Sized>(page: &Dict, graph: &G) -> FontSet {
    let mut set = FontSet::new();
    let Some(resources) = page.get("Resources").and_then(|o| deref_dict(graph, o)) else {
        return set;
    };
    let Some(fonts) = resources.get("Font").and_then(|o| deref_dict(graph, o)) else {
        return set;
    };
    for (name, font_obj) in fonts.iter() {
        let Some(font_dict) = deref_dict(graph, font_obj) else {
            continue;
        };
        let Some(to_unicode) = font_dict.get("ToUnicode") else {
            continue;
        };
        let resolved = deref(graph, to_unicode);
        if !matches!(resolved, Object::Stream(_, _)) {
            continue;
        }
        let ops = graph.content_ops(&resolved);
        let cmap = parse_cmap(&ops);
        if !cmap.is_empty() {
            set.push((name.clone(), cmap));
        }
    }
    set
}
