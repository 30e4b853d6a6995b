use crate::dumper::Dumper;

/// Notes the decompiler attaches to a member, rendered above it.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DecompilerComments {
    comments: Vec<String>,
}
impl DecompilerComments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, comment: impl Into<String>) {
        let comment = comment.into();
        if !self.comments.contains(&comment) {
            self.comments.push(comment);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.comments.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn dump(&self, d: &mut dyn Dumper) {
        for comment in &self.comments {
            d.comment(comment);
        }
    }
}
