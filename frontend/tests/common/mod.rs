#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use community_hub_frontend::{ClientError, CommentService, Page};
use community_hub_shared::{
    validation::ValidationErrors, Comment, CommentPatch, CommentQuery, NewComment, Pagination,
    ParentFilter,
};
use tokio::sync::oneshot;

pub fn comment(id: &str, approved: bool, parent: Option<&str>) -> Comment {
    Comment {
        id: id.to_string(),
        content: format!("content of {id}"),
        author_name: "Ada".to_string(),
        author_email: "ada@example.com".to_string(),
        is_approved: approved,
        created_at: Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .expect("valid date"),
        updated_at: None,
        parent_id: parent.map(str::to_string),
        event_id: Some("ev-1".to_string()),
        reply_count: None,
        replies: None,
    }
}

pub fn new_comment(content: &str) -> NewComment {
    NewComment {
        content: content.to_string(),
        author_name: "Grace".to_string(),
        author_email: "grace@example.com".to_string(),
        event_id: Some("ev-1".to_string()),
        parent_id: None,
    }
}

fn not_found() -> ClientError {
    ClientError::application(Some("Comment not found".to_string()), ValidationErrors::new())
}

/// In-memory comment backend that behaves like the REST API.
#[derive(Default)]
pub struct FakeComments {
    table: Mutex<Vec<Comment>>,
    next_id: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub reply_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub last_query: Mutex<Option<CommentQuery>>,
    /// Return replies from listings regardless of `parentId`.
    pub ignore_parent_filter: bool,
    fail_list: Mutex<Option<ClientError>>,
    fail_replies: Mutex<Option<ClientError>>,
    list_gate: Mutex<Option<oneshot::Receiver<()>>>,
    reply_gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl FakeComments {
    pub fn with(comments: Vec<Comment>) -> Self {
        Self {
            table: Mutex::new(comments),
            ..Self::default()
        }
    }

    pub fn ignoring_parent_filter(mut self) -> Self {
        self.ignore_parent_filter = true;
        self
    }

    pub fn insert(&self, comment: Comment) {
        self.table.lock().expect("table lock").push(comment);
    }

    pub fn remove(&self, id: &str) {
        self.table.lock().expect("table lock").retain(|c| c.id != id);
    }

    pub fn fail_next_list(&self, err: ClientError) {
        *self.fail_list.lock().expect("fail lock") = Some(err);
    }

    pub fn fail_next_replies(&self, err: ClientError) {
        *self.fail_replies.lock().expect("fail lock") = Some(err);
    }

    /// Hold the next list call until the returned sender fires.
    pub fn hold_next_list(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.list_gate.lock().expect("gate lock") = Some(rx);
        tx
    }

    pub fn hold_next_replies(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.reply_gate.lock().expect("gate lock") = Some(rx);
        tx
    }

    pub fn lists(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn reply_fetches(&self) -> usize {
        self.reply_calls.load(Ordering::SeqCst)
    }

    pub fn creates(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<CommentQuery> {
        self.last_query.lock().expect("query lock").clone()
    }
}

#[async_trait]
impl CommentService for FakeComments {
    async fn list_comments(&self, query: &CommentQuery) -> Result<Page<Comment>, ClientError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().expect("query lock") = Some(query.clone());
        let gate = self.list_gate.lock().expect("gate lock").take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if let Some(err) = self.fail_list.lock().expect("fail lock").take() {
            return Err(err);
        }

        let table = self.table.lock().expect("table lock");
        let items: Vec<Comment> = table
            .iter()
            .filter(|c| query.event_id.is_none() || c.event_id == query.event_id)
            .filter(|c| query.approved.is_none() || Some(c.is_approved) == query.approved)
            .filter(|c| {
                self.ignore_parent_filter
                    || match &query.parent {
                        ParentFilter::Any => true,
                        ParentFilter::TopLevel => c.parent_id.is_none(),
                        ParentFilter::ChildOf(parent) => c.parent_id.as_ref() == Some(parent),
                    }
            })
            .cloned()
            .collect();
        let pagination = Pagination::single_page(items.len() as u64);
        Ok(Page {
            items,
            pagination,
        })
    }

    async fn list_replies(&self, parent_id: &str) -> Result<Vec<Comment>, ClientError> {
        self.reply_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.reply_gate.lock().expect("gate lock").take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if let Some(err) = self.fail_replies.lock().expect("fail lock").take() {
            return Err(err);
        }
        let table = self.table.lock().expect("table lock");
        Ok(table
            .iter()
            .filter(|c| c.parent_id.as_deref() == Some(parent_id))
            .cloned()
            .collect())
    }

    async fn create_comment(&self, new: &NewComment) -> Result<Comment, ClientError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let id = format!("new-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let mut created = comment(&id, false, new.parent_id.as_deref());
        created.content = new.content.clone();
        created.author_name = new.author_name.clone();
        created.author_email = new.author_email.clone();
        created.event_id = new.event_id.clone();
        self.insert(created.clone());
        Ok(created)
    }

    async fn update_comment(
        &self,
        id: &str,
        patch: CommentPatch,
    ) -> Result<Comment, ClientError> {
        let mut table = self.table.lock().expect("table lock");
        let record = table.iter_mut().find(|c| c.id == id).ok_or_else(not_found)?;
        record.is_approved = patch.is_approved;
        Ok(record.clone())
    }

    async fn delete_comment(&self, id: &str) -> Result<(), ClientError> {
        let mut table = self.table.lock().expect("table lock");
        let before = table.len();
        table.retain(|c| c.id != id);
        if table.len() == before {
            return Err(not_found());
        }
        Ok(())
    }
}
