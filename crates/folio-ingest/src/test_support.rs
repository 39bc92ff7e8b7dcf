//! Scriptable transport and parser doubles for coordinator tests.
//!
//! Always compiled so integration tests (in tests/) can use them. The mock
//! transport records every outward call and can be scripted to fail specific
//! operations with queued errors, which is how the delivery-policy scenarios
//! are exercised.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use folio_core::{
    ChatId, DocumentParser, DocumentTransport, Error, FileId, MessageId, OutboundDocument,
    PublishedMessage, RawDocumentInfo, Result, ThreadId,
};

/// A recorded `publish_document` call.
#[derive(Debug, Clone)]
pub struct PublishRecord {
    pub chat: ChatId,
    pub thread: ThreadId,
    pub file_name: String,
    pub caption: String,
    pub message: MessageId,
}

/// A recorded `edit_document` call.
#[derive(Debug, Clone)]
pub struct EditRecord {
    pub chat: ChatId,
    pub message: MessageId,
    pub file_name: String,
    pub caption: String,
}

/// A recorded `send_document` call (archival copies).
#[derive(Debug, Clone)]
pub struct SendRecord {
    pub chat: ChatId,
    pub file: FileId,
    pub caption: String,
}

/// In-memory transport double.
#[derive(Default)]
pub struct MockTransport {
    files: Mutex<HashMap<String, Vec<u8>>>,
    next_id: AtomicI64,
    pub published: Mutex<Vec<PublishRecord>>,
    pub edited: Mutex<Vec<EditRecord>>,
    pub sent: Mutex<Vec<SendRecord>>,
    pub notices: Mutex<Vec<(ChatId, ThreadId, String)>>,
    pub deleted: Mutex<Vec<(ChatId, MessageId)>>,
    pub text_edits: Mutex<Vec<(ChatId, MessageId, String)>>,
    publish_failures: Mutex<VecDeque<Error>>,
    edit_failures: Mutex<VecDeque<Error>>,
    send_failures: Mutex<VecDeque<Error>>,
    text_edit_failures: Mutex<VecDeque<Error>>,
    pub publish_attempts: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1000),
            ..Self::default()
        }
    }

    /// Register uploadable bytes, returning the transport file reference.
    pub fn add_file(&self, name: &str, bytes: &[u8]) -> FileId {
        self.files
            .lock()
            .unwrap()
            .insert(name.to_string(), bytes.to_vec());
        FileId(name.to_string())
    }

    /// Queue an error for the next `publish_document` call.
    pub fn fail_next_publish(&self, err: Error) {
        self.publish_failures.lock().unwrap().push_back(err);
    }

    /// Queue an error for the next `edit_document` call.
    pub fn fail_next_edit(&self, err: Error) {
        self.edit_failures.lock().unwrap().push_back(err);
    }

    /// Queue an error for the next `send_document` call.
    pub fn fail_next_send(&self, err: Error) {
        self.send_failures.lock().unwrap().push_back(err);
    }

    /// Queue an error for the next `edit_text` call.
    pub fn fail_next_text_edit(&self, err: Error) {
        self.text_edit_failures.lock().unwrap().push_back(err);
    }

    pub fn publish_count(&self) -> usize {
        self.published.lock().unwrap().len()
    }

    pub fn archive_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    fn alloc_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentTransport for MockTransport {
    async fn fetch_file(&self, file: &FileId) -> Result<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(file.as_str())
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("file {file}")))
    }

    async fn publish_document(
        &self,
        chat: ChatId,
        thread: ThreadId,
        doc: &OutboundDocument,
    ) -> Result<PublishedMessage> {
        self.publish_attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.publish_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        let id = self.alloc_id();
        let message = MessageId(id);
        self.published.lock().unwrap().push(PublishRecord {
            chat,
            thread,
            file_name: doc.file_name.clone(),
            caption: doc.caption.clone(),
            message,
        });
        Ok(PublishedMessage {
            message,
            file: FileId(format!("stored-{id}")),
        })
    }

    async fn edit_document(
        &self,
        chat: ChatId,
        message: MessageId,
        doc: &OutboundDocument,
    ) -> Result<PublishedMessage> {
        if let Some(err) = self.edit_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        self.edited.lock().unwrap().push(EditRecord {
            chat,
            message,
            file_name: doc.file_name.clone(),
            caption: doc.caption.clone(),
        });
        Ok(PublishedMessage {
            message,
            file: FileId(format!("stored-{}", self.alloc_id())),
        })
    }

    async fn send_document(&self, chat: ChatId, file: &FileId, caption: &str) -> Result<()> {
        if let Some(err) = self.send_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        self.sent.lock().unwrap().push(SendRecord {
            chat,
            file: file.clone(),
            caption: caption.to_string(),
        });
        Ok(())
    }

    async fn delete_message(&self, chat: ChatId, message: MessageId) -> Result<()> {
        self.deleted.lock().unwrap().push((chat, message));
        Ok(())
    }

    async fn edit_text(&self, chat: ChatId, message: MessageId, text: &str) -> Result<()> {
        if let Some(err) = self.text_edit_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        self.text_edits
            .lock()
            .unwrap()
            .push((chat, message, text.to_string()));
        Ok(())
    }

    async fn send_notice(&self, chat: ChatId, thread: ThreadId, text: &str) -> Result<()> {
        self.notices
            .lock()
            .unwrap()
            .push((chat, thread, text.to_string()));
        Ok(())
    }
}

/// Parser double reading plain-text "documents".
///
/// Line 1 is the metadata title field, line 2 the page count (defaulting to
/// 1). Tracks how many times it was invoked so tests can assert that
/// duplicates never reach the parser.
#[derive(Default)]
pub struct StubParser {
    pub calls: AtomicUsize,
}

impl StubParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DocumentParser for StubParser {
    fn parse(&self, bytes: &[u8]) -> Result<RawDocumentInfo> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let text = std::str::from_utf8(bytes)
            .map_err(|_| Error::MetadataFormat("document metadata is not readable".to_string()))?;
        let mut lines = text.lines();
        let title_field = lines
            .next()
            .map(str::to_string)
            .filter(|s| !s.trim().is_empty());
        let page_count = lines
            .next()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .unwrap_or(1);
        Ok(RawDocumentInfo {
            title_field,
            page_count,
        })
    }
}
