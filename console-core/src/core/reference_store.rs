//! Shared cache of reference lookup tables.
//!
//! Languages, models, prompts and report reasons are loaded once and read by
//! selection widgets. Tables are only ever replaced whole.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use super::models::{Language, Model, Prompt, ReportReason};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReferenceTables {
    pub languages: Vec<Language>,
    pub models: Vec<Model>,
    pub prompts: Vec<Prompt>,
    pub report_reasons: Vec<ReportReason>,
    pub balance: i64,
}

#[derive(Debug, Default)]
pub struct ReferenceStore {
    tables: RwLock<ReferenceTables>,
}

impl ReferenceStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn replace_languages(&self, items: Vec<Language>) {
        self.tables.write().await.languages = items;
    }

    pub async fn replace_models(&self, items: Vec<Model>) {
        self.tables.write().await.models = items;
    }

    pub async fn replace_prompts(&self, items: Vec<Prompt>) {
        self.tables.write().await.prompts = items;
    }

    pub async fn replace_report_reasons(&self, items: Vec<ReportReason>) {
        self.tables.write().await.report_reasons = items;
    }

    pub async fn set_balance(&self, balance: i64) {
        self.tables.write().await.balance = balance;
    }

    pub async fn languages(&self) -> Vec<Language> {
        self.tables.read().await.languages.clone()
    }

    pub async fn models(&self) -> Vec<Model> {
        self.tables.read().await.models.clone()
    }

    pub async fn prompts(&self) -> Vec<Prompt> {
        self.tables.read().await.prompts.clone()
    }

    pub async fn report_reasons(&self) -> Vec<ReportReason> {
        self.tables.read().await.report_reasons.clone()
    }

    pub async fn balance(&self) -> i64 {
        self.tables.read().await.balance
    }

    /// Copy of every table at once.
    pub async fn snapshot(&self) -> ReferenceTables {
        self.tables.read().await.clone()
    }
}
