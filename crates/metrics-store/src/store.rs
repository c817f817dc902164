//! The store itself: collections of documents plus the write path.

use std::collections::BTreeMap;

use metrics_policy::{
    evaluate, Actor, Collection, Decision, DenialReason, Document, FeatureConfig, Operation,
    StoreSnapshot,
};

/// Failure of a store operation.
///
/// Denials are terminal and non-retryable; `NotFound` is the only
/// store-level failure of its own.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("request denied: {0}")]
    Denied(#[from] DenialReason),
    #[error("document `{id}` not found in `{collection}`")]
    NotFound { collection: Collection, id: String },
}

/// An in-memory document store.
///
/// Doubles as the [`StoreSnapshot`] the evaluator reads: the feature-config
/// singleton and the allowed-domain set are ordinary documents, looked up
/// on demand.
#[derive(Debug, Clone, Default)]
pub struct MetricsStore {
    collections: BTreeMap<Collection, BTreeMap<String, Document>>,
    next_id: u64,
}

impl StoreSnapshot for MetricsStore {
    fn feature_config(&self) -> FeatureConfig {
        self.docs(Collection::FeatureConfig)
            .and_then(|docs| docs.get(FeatureConfig::DOC_ID))
            .map(FeatureConfig::from_document)
            .unwrap_or_default()
    }

    fn is_email_domain_allowed(&self, domain: &str) -> bool {
        self.contains(Collection::AllowedEmailDomains, domain)
    }

    fn project_exists(&self, project_id: &str) -> bool {
        self.contains(Collection::Projects, project_id)
    }
}

impl MetricsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a document under a fresh id on behalf of `actor`.
    pub fn create(
        &mut self,
        actor: &Actor,
        collection: Collection,
        doc: Document,
    ) -> Result<String, StoreError> {
        self.authorize(actor, Operation::Create, collection, None, Some(&doc))?;
        let id = self.fresh_id(collection);
        self.docs_mut(collection).insert(id.clone(), doc);
        Ok(id)
    }

    /// Creates a document under a caller-chosen id (user profiles are keyed
    /// by the owner's uid).
    pub fn create_with_id(
        &mut self,
        actor: &Actor,
        collection: Collection,
        id: &str,
        doc: Document,
    ) -> Result<(), StoreError> {
        self.authorize(actor, Operation::Create, collection, Some(id), Some(&doc))?;
        self.docs_mut(collection).insert(id.to_string(), doc);
        Ok(())
    }

    /// Applies a partial update: `changes` is merged over the stored
    /// document and the merged result is what the evaluator validates.
    /// A denied update leaves the document untouched.
    pub fn update(
        &mut self,
        actor: &Actor,
        collection: Collection,
        id: &str,
        changes: &Document,
    ) -> Result<(), StoreError> {
        let current = self
            .docs(collection)
            .and_then(|docs| docs.get(id))
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_string(),
            })?;
        let merged = current.merged_with(changes);
        self.authorize(actor, Operation::Update, collection, Some(id), Some(&merged))?;
        self.docs_mut(collection).insert(id.to_string(), merged);
        Ok(())
    }

    pub fn delete(
        &mut self,
        actor: &Actor,
        collection: Collection,
        id: &str,
    ) -> Result<Document, StoreError> {
        self.authorize(actor, Operation::Delete, collection, Some(id), None)?;
        self.docs_mut(collection)
            .remove(id)
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_string(),
            })
    }

    pub fn get(
        &self,
        actor: &Actor,
        collection: Collection,
        id: &str,
    ) -> Result<&Document, StoreError> {
        self.authorize(actor, Operation::Get, collection, Some(id), None)?;
        self.docs(collection)
            .and_then(|docs| docs.get(id))
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_string(),
            })
    }

    pub fn list(
        &self,
        actor: &Actor,
        collection: Collection,
    ) -> Result<Vec<(&str, &Document)>, StoreError> {
        self.authorize(actor, Operation::List, collection, None, None)?;
        Ok(self
            .docs(collection)
            .into_iter()
            .flatten()
            .map(|(id, doc)| (id.as_str(), doc))
            .collect())
    }

    /// Exact membership check on the domain part of `email`; subdomains of
    /// an allowed domain do not qualify.
    pub fn validate_email_domain(&self, email: &str) -> bool {
        email
            .split_once('@')
            .is_some_and(|(_, domain)| !domain.is_empty() && self.is_email_domain_allowed(domain))
    }

    /// Administrative handle; mutations through it bypass the evaluator.
    pub fn admin(&mut self) -> Admin<'_> {
        Admin { store: self }
    }

    fn authorize(
        &self,
        actor: &Actor,
        operation: Operation,
        collection: Collection,
        target_doc_id: Option<&str>,
        proposed: Option<&Document>,
    ) -> Result<(), StoreError> {
        match evaluate(actor, operation, collection, target_doc_id, proposed, self) {
            Decision::Allow => Ok(()),
            Decision::Deny { reason } => Err(StoreError::Denied(reason)),
        }
    }

    fn docs(&self, collection: Collection) -> Option<&BTreeMap<String, Document>> {
        self.collections.get(&collection)
    }

    fn docs_mut(&mut self, collection: Collection) -> &mut BTreeMap<String, Document> {
        self.collections.entry(collection).or_default()
    }

    fn contains(&self, collection: Collection, id: &str) -> bool {
        self.docs(collection).is_some_and(|docs| docs.contains_key(id))
    }

    fn fresh_id(&mut self, collection: Collection) -> String {
        loop {
            self.next_id += 1;
            let id = self.next_id.to_string();
            if !self.contains(collection, &id) {
                return id;
            }
        }
    }
}

/// Administrative mutations: flag tooling and seeding write through this
/// handle, outside the evaluator's scope.
pub struct Admin<'a> {
    store: &'a mut MetricsStore,
}

impl Admin<'_> {
    pub fn insert(&mut self, collection: Collection, id: &str, doc: Document) {
        tracing::debug!(collection = collection.as_str(), id, "admin insert");
        self.store.docs_mut(collection).insert(id.to_string(), doc);
    }

    pub fn insert_new(&mut self, collection: Collection, doc: Document) -> String {
        let id = self.store.fresh_id(collection);
        self.insert(collection, &id, doc);
        id
    }

    pub fn remove(&mut self, collection: Collection, id: &str) -> Option<Document> {
        tracing::debug!(collection = collection.as_str(), id, "admin remove");
        self.store.docs_mut(collection).remove(id)
    }

    pub fn set_feature_config(&mut self, config: FeatureConfig) {
        self.insert(
            Collection::FeatureConfig,
            FeatureConfig::DOC_ID,
            config.to_document(),
        );
    }

    /// Allowed domains are stored as document ids with empty bodies.
    pub fn allow_email_domain(&mut self, domain: &str) {
        self.insert(Collection::AllowedEmailDomains, domain, Document::new());
    }
}
