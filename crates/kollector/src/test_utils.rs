use crate::error::{KollectorError, Result};
use crate::model::{Collectible, RelatedSubject, SubjectKind};
use crate::remote::RemoteDataSource;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A collectible with enough fields filled in to make equality checks meaningful.
pub fn sample(id: &str) -> Collectible {
    let mut item = Collectible::new(id, format!("Figure {}", id))
        .with_gallery(vec![format!("{}-front.png", id)]);
    item.attributes.estimated_value_range = vec![Some(10.0), None];
    item.attributes.related_subjects =
        vec![RelatedSubject::new("Marvel", SubjectKind::AiClassified)];
    item
}

pub fn samples(ids: &[&str]) -> Vec<Collectible> {
    ids.iter().map(|id| sample(id)).collect()
}

/// Remote double that serves a fixed list and counts calls.
#[derive(Default)]
pub struct StubRemote {
    items: Vec<Collectible>,
    failure: Option<String>,
    calls: AtomicUsize,
    last_user_id: Mutex<Option<String>>,
}

impl StubRemote {
    pub fn new(items: Vec<Collectible>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_user_id(&self) -> Option<String> {
        self.last_user_id
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl RemoteDataSource for StubRemote {
    async fn fetch_collectibles(&self, user_id: &str) -> Result<Vec<Collectible>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_user_id.lock().unwrap_or_else(|e| e.into_inner()) = Some(user_id.to_string());
        match &self.failure {
            Some(message) => Err(KollectorError::RemoteFetch(message.clone())),
            None => Ok(self.items.clone()),
        }
    }
}
