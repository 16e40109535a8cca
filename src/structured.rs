//! Structured walker (4.F): DFS over the tagged-PDF structure tree,
//! collecting `/Table` nodes and correlating their cells' MCIDs with text
//! accumulated by the content-stream interpreter (4.E).

use std::collections::{HashMap, HashSet};

use crate::error::{Result, TableError};
use crate::font_cache::FontCache;
use crate::interpreter::{Interpreter, Mode};
use crate::object_graph::{deref, deref_dict, Dict, Object, ObjId, ObjectGraph};

/// How deep `search` will recurse before giving up on a subtree — a
/// non-functional hardening absent from the original (Design Notes §9).
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits { max_depth: 64 }
    }
}

type CellRef = Vec<i64>;

/// A table reconstructed from the logical structure tree.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StructuredTable {
    caption_mcid: Option<i64>,
    rows: Vec<Vec<CellRef>>,
    mcid_map: HashMap<i64, String>,
}

impl StructuredTable {
    pub fn get_data(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell_mcids| {
                        cell_mcids
                            .iter()
                            .map(|mcid| self.mcid_map.get(mcid).cloned().unwrap_or_default())
                            .collect::<String>()
                    })
                    .collect()
            })
            .collect()
    }

    pub fn caption_text(&self) -> Option<String> {
        self.caption_mcid
            .and_then(|mcid| self.mcid_map.get(&mcid).cloned())
    }

    pub fn show(&self) {
        if self.caption_mcid.is_some() {
            println!("{}", self.caption_text().unwrap_or_default());
        }
        for row in self.get_data() {
            println!("{}", row.join("|"));
        }
    }
}

/// Walks a `/StructTreeRoot`, collecting every `/Table` node found.
pub struct StructuredWalker<'g, G: ObjectGraph + ?Sized> {
    graph: &'g G,
    font_cache: &'g mut FontCache,
    limits: Limits,
}

impl<'g, G: ObjectGraph + ?Sized> StructuredWalker<'g, G> {
    pub fn new(graph: &'g G, font_cache: &'g mut FontCache) -> Self {
        StructuredWalker {
            graph,
            font_cache,
            limits: Limits::default(),
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn search(&mut self, struct_tree_root: &Dict) -> Vec<StructuredTable> {
        let mut tables = Vec::new();
        let mut visiting = HashSet::new();
        if let Some(k) = struct_tree_root.get("K") {
            self.search_node_list(k, &mut tables, &mut visiting, 0);
        }
        tables
    }

    fn search_node_list(
        &mut self,
        node: &Object,
        tables: &mut Vec<StructuredTable>,
        visiting: &mut HashSet<ObjId>,
        depth: usize,
    ) {
        match node {
            Object::Array(items) => {
                for item in items {
                    if let Err(err) = self.process_node(item, tables, visiting, depth) {
                        tracing::debug!(error = %err, "structured walker: node skipped");
                    }
                }
            }
            other => {
                if let Err(err) = self.process_node(other, tables, visiting, depth) {
                    tracing::debug!(error = %err, "structured walker: node skipped");
                }
            }
        }
    }

    /// Visits one node of the structure tree. `visiting` tracks only the
    /// current recursion path: a reference is inserted before descending
    /// into it and removed again before returning, so the same object id
    /// can legitimately appear in two unrelated subtrees — only a node
    /// that refers back to one of its own ancestors is a cycle.
    fn process_node(
        &mut self,
        node: &Object,
        tables: &mut Vec<StructuredTable>,
        visiting: &mut HashSet<ObjId>,
        depth: usize,
    ) -> Result<()> {
        if depth > self.limits.max_depth {
            return Err(TableError::DepthExceeded(depth));
        }
        if matches!(node, Object::Integer(_)) {
            return Ok(());
        }

        let id = node.as_reference();
        if let Some(id) = id {
            if !visiting.insert(id) {
                tracing::debug!(object = ?id, "structured walker: cycle detected, skipping");
                return Ok(());
            }
        }

        let resolved = deref(self.graph, node);
        if let Some(dict) = resolved.as_dict().cloned() {
            if tag_equals(&dict, "Table") {
                tables.push(self.build_table(&dict, visiting, depth + 1));
            } else if let Some(k) = dict.get("K") {
                self.search_node_list(k, tables, visiting, depth + 1);
            }
        }

        if let Some(id) = id {
            visiting.remove(&id);
        }
        Ok(())
    }

    fn build_table(
        &mut self,
        table_dict: &Dict,
        visiting: &mut HashSet<ObjId>,
        depth: usize,
    ) -> StructuredTable {
        let mut table = StructuredTable::default();
        let mut page_fixed = false;

        let Some(children) = table_dict.get("K") else {
            return table;
        };
        let child_list = match children {
            Object::Array(items) => items.clone(),
            other => vec![other.clone()],
        };

        for child in &child_list {
            if depth > self.limits.max_depth {
                break;
            }
            let Some(child_dict) = deref(self.graph, child).as_dict().cloned() else {
                continue;
            };

            if !page_fixed {
                if let Some(pg_ref) = child_dict.get("Pg").and_then(Object::as_reference) {
                    if let Err(err) = self.fix_page(pg_ref, &mut table) {
                        tracing::debug!(error = %err, page = ?pg_ref, "structured walker: page fix-up skipped");
                    }
                    page_fixed = true;
                }
            }

            if tag_equals(&child_dict, "TR") {
                let mut row = Vec::new();
                if let Some(cells) = child_dict.get("K") {
                    let cell_list = match cells {
                        Object::Array(items) => items.clone(),
                        other => vec![other.clone()],
                    };
                    for cell in &cell_list {
                        if !page_fixed {
                            if let Some(pg_ref) = deref(self.graph, cell)
                                .as_dict()
                                .and_then(|d| d.get("Pg").and_then(Object::as_reference))
                            {
                                if let Err(err) = self.fix_page(pg_ref, &mut table) {
                                    tracing::debug!(error = %err, page = ?pg_ref, "structured walker: page fix-up skipped");
                                }
                                page_fixed = true;
                            }
                        }
                        row.push(collect_mcids(self.graph, cell, visiting));
                    }
                }
                table.rows.push(row);
            } else if tag_equals(&child_dict, "Caption") {
                if let Some(Object::Integer(mcid)) = child_dict.get("K") {
                    table.caption_mcid = Some(*mcid);
                }
            }
        }

        table
    }

    /// Activates the page's font set and accumulates its content stream's
    /// text per MCID. Fails (without panicking) on the boundary violations
    /// the object-graph collaborator can hand back; the caller downgrades
    /// any such error to "leave this table's cells unresolved" and moves on.
    fn fix_page(&mut self, pg_ref: ObjId, table: &mut StructuredTable) -> Result<()> {
        let Some(page_dict) = deref_dict(self.graph, &Object::Reference(pg_ref)) else {
            return Err(TableError::UnexpectedObject(format!(
                "/Pg {pg_ref:?} did not resolve to a dictionary"
            )));
        };
        let font_set = self.font_cache.process_fonts(pg_ref, &page_dict, self.graph).clone();
        let Some(contents) = page_dict.get("Contents") else {
            return Err(TableError::UnexpectedObject(format!(
                "page {pg_ref:?} has no /Contents"
            )));
        };
        let resolved = deref(self.graph, contents);
        if !matches!(resolved, Object::Stream(_, _) | Object::Array(_)) {
            return Err(TableError::NotAContentStream);
        }
        let ops = self.graph.content_ops(&resolved);
        let mut interp = Interpreter::new(Mode::Hex, &font_set);
        for event in interp.run(ops) {
            if let Some(mcid) = event.mcid {
                table.mcid_map.entry(mcid).or_default().push_str(&event.text);
            }
        }
        Ok(())
    }
}

fn tag_equals(dict: &Dict, expected: &str) -> bool {
    dict.get("S")
        .and_then(Object::as_name)
        .map(|s| s.eq_ignore_ascii_case(expected))
        .unwrap_or(false)
}

/// Resolve a cell's `/K` value into the list of MCIDs it ultimately
/// references, following indirect hops (possibly through a nested
/// structure element carrying its own `/K`) with cycle protection.
/// `visiting` is scoped to the current recursion path, mirroring
/// `process_node` above: an id is removed again once its subtree is
/// done, so the same object can be referenced from two different cells
/// without being mistaken for a cycle.
fn collect_mcids<G: ObjectGraph + ?Sized>(
    graph: &G,
    node: &Object,
    visiting: &mut HashSet<ObjId>,
) -> Vec<i64> {
    match node {
        Object::Integer(n) => vec![*n],
        Object::Array(items) => items
            .iter()
            .flat_map(|item| collect_mcids(graph, item, visiting))
            .collect(),
        Object::Reference(id) => {
            if !visiting.insert(*id) {
                return Vec::new();
            }
            let resolved = deref(graph, node);
            let result = collect_mcids(graph, &resolved, visiting);
            visiting.remove(id);
            result
        }
        Object::Dictionary(d) => d
            .get("K")
            .map(|k| collect_mcids(graph, k, visiting))
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}
