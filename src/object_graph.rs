//! Compile-time boundary types standing in for the external PDF parser's
//! object model. The core never parses bytes into these values itself; it
//! only consumes them through [`ObjectGraph`].

/// Stable identifier for an indirect object: `(object number, generation)`.
pub type ObjId = (u32, u16);

/// A PDF object as handed back by the object-graph collaborator.
///
/// Byte strings and text strings are kept distinct on purpose: 4.D's literal
/// mode treats them differently (a `TextString` is already decoded and is
/// appended verbatim, a `ByteString` still goes through the CMap decoder).
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Name(String),
    ByteString(Vec<u8>),
    TextString(String),
    Array(Vec<Object>),
    Dictionary(Dict),
    Stream(Dict, Vec<u8>),
    Reference(ObjId),
}

impl Object {
    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Object::Dictionary(d) => Some(d),
            Object::Stream(d, _) => Some(d),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Object::Integer(n) => Some(*n),
            Object::Real(n) => Some(*n as i64),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Object::Name(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<ObjId> {
        match self {
            Object::Reference(id) => Some(*id),
            _ => None,
        }
    }
}

/// An order-preserving PDF dictionary. Order matters: the Font-cache (4.C)
/// walks `Resources/Font` in dictionary order to build an ordered FontSet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dict(pub Vec<(String, Object)>);

impl Dict {
    pub fn new() -> Self {
        Dict(Vec::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Object) {
        self.0.push((key.into(), value));
    }

    pub fn get(&self, key: &str) -> Option<&Object> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, Object)> {
        self.0.iter()
    }
}

/// A page as handed back by the collaborator's [`ObjectGraph::pages`] — page
/// iteration itself is out of the core's scope; only the resulting ordered
/// list is consumed.
#[derive(Debug, Clone)]
pub struct PageRef {
    pub id: ObjId,
    pub dict: Dict,
}

/// A single content-stream operation already tokenized by the collaborator:
/// an operand list followed by an operator name.
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operands: Vec<crate::content::Operand>,
    pub operator: String,
}

/// The external collaborator's interface, as consumed by this core.
///
/// Implementors own the arena; every method here returns owned values for
/// the duration of a single call, the core never borrows into the
/// collaborator's storage directly.
pub trait ObjectGraph {
    /// Resolve an indirect reference to its concrete object.
    fn get_object(&self, id: ObjId) -> Option<Object>;

    /// The document Catalog dictionary, already dereferenced.
    fn catalog(&self) -> Option<Dict>;

    /// Pages in page order.
    fn pages(&self) -> Vec<PageRef>;

    /// Tokenize a (resolved) stream or array-of-streams object into
    /// `(operands, operator)` pairs. Decompression, stream concatenation and
    /// byte-level tokenization all happen on the collaborator side.
    fn content_ops(&self, contents: &Object) -> Vec<ContentOp>;
}

/// Follow `Object::Reference` until a concrete object is reached, a bounded
/// number of hops. PDF indirection is not supposed to chain, but nothing
/// stops a malformed document from doing so; this is defensive, not
/// functional.
pub fn deref<G: ObjectGraph + ?Sized>(graph: &G, obj: &Object) -> Object {
    const MAX_HOPS: usize = 8;
    let mut current = obj.clone();
    for _ in 0..MAX_HOPS {
        match current {
            Object::Reference(id) => match graph.get_object(id) {
                Some(next) => current = next,
                None => return Object::Null,
            },
            other => return other,
        }
    }
    Object::Null
}

pub fn deref_dict<G: ObjectGraph + ?Sized>(graph: &G, obj: &Object) -> Option<Dict> {
    deref(graph, obj).as_dict().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dict_preserves_insertion_order() {
        let mut d = Dict::new();
        d.insert("F2", Object::Integer(2));
        d.insert("F1", Object::Integer(1));
        let keys: Vec<&str> = d.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["F2", "F1"]);
    }

    #[test]
    fn dict_get_finds_by_key() {
        let mut d = Dict::new();
        d.insert("MCID", Object::Integer(7));
        assert_eq!(d.get("MCID").and_then(Object::as_i64), Some(7));
        assert!(d.get("Missing").is_none());
    }
}
