use pdf_writer::Ref;
use std::collections::HashMap;

/// Every kind of indirect object an invoice PDF contains, keyed by the index of the
/// page, font or image it belongs to
#[derive(Eq, PartialEq, Hash, Copy, Clone, Debug)]
pub enum RefType {
    Catalog,
    Info,
    PageTree,
    Page(usize),
    ContentForPage(usize),
    Font(usize),
    CidFont(usize),
    ToUnicode(usize),
    FontDescriptor(usize),
    FontData(usize),
    Image(usize),
    ImageMask(usize),
}

/// Hands out object numbers and remembers which object got which
pub struct ObjectReferences {
    refs: HashMap<RefType, Ref>,
    next_id: i32,
}

impl ObjectReferences {
    pub fn new() -> ObjectReferences {
        ObjectReferences {
            refs: HashMap::new(),
            next_id: 1,
        }
    }

    fn new_id(&mut self) -> Ref {
        let id = self.next_id;
        self.next_id += 1;
        Ref::new(id)
    }

    pub fn get(&self, ref_type: RefType) -> Option<Ref> {
        self.refs.get(&ref_type).copied()
    }

    pub fn gen(&mut self, ref_type: RefType) -> Ref {
        let id = self.new_id();
        self.refs.insert(ref_type, id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_sequential_and_remembered() {
        let mut refs = ObjectReferences::new();
        let catalog = refs.gen(RefType::Catalog);
        let page = refs.gen(RefType::Page(0));
        assert_eq!(catalog.get(), 1);
        assert_eq!(page.get(), 2);
        assert_eq!(refs.get(RefType::Page(0)), Some(page));
        assert_eq!(refs.get(RefType::Page(1)), None);
    }
}
