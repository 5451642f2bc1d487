//! Deduplicating merge of per-query results

use super::RetrievedDocument;
use std::collections::HashSet;

/// Documents from several searches, unique by source id, in first-seen order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedDocuments {
    documents: Vec<RetrievedDocument>,
    seen: HashSet<String>,
}

impl MergedDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document unless its source id is already present
    ///
    /// Returns whether the document was added. The first copy of a source
    /// wins, including its score.
    pub fn insert(&mut self, document: RetrievedDocument) -> bool {
        if self.seen.contains(&document.id) {
            return false;
        }
        self.seen.insert(document.id.clone());
        self.documents.push(document);
        true
    }

    /// Fold in one search's results; returns how many were new
    pub fn extend<I>(&mut self, documents: I) -> usize
    where
        I: IntoIterator<Item = RetrievedDocument>,
    {
        documents
            .into_iter()
            .map(|doc| self.insert(doc))
            .filter(|added| *added)
            .count()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RetrievedDocument> {
        self.documents.iter()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.documents.iter().map(|d| d.id.as_str()).collect()
    }

    pub fn as_slice(&self) -> &[RetrievedDocument] {
        &self.documents
    }

    pub fn into_vec(self) -> Vec<RetrievedDocument> {
        self.documents
    }
}

impl<'a> IntoIterator for &'a MergedDocuments {
    type Item = &'a RetrievedDocument;
    type IntoIter = std::slice::Iter<'a, RetrievedDocument>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}

/// Merge result lists in the order given
pub fn merge_results<I>(batches: I) -> MergedDocuments
where
    I: IntoIterator<Item = Vec<RetrievedDocument>>,
{
    let mut merged = MergedDocuments::new();
    for batch in batches {
        merged.extend(batch);
    }
    merged
}
