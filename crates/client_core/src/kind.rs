//! Record kinds handled by the generic item-list controller.
//!
//! A kind ties together the wire types of one REST collection, the strings shown for it,
//! and the per-kind rendering differences (tags for blog posts, completion for todos).

use std::fmt::Debug;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{BlogPost, RecordId, Todo},
    protocol::{BlogPostChanges, NewBlogPost, NewTodo, TodoChanges},
};

/// How timestamps are written in the metadata line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampStyle {
    /// `3/1/2024, 9:30:00 AM`
    EnUs,
    /// `2024. 3. 1. 오전 9:30:00`
    KoKr,
}

/// User-visible strings for one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locale {
    pub empty_state: &'static str,
    pub load_failed: &'static str,
    pub no_content: &'static str,
    pub created_label: &'static str,
    pub updated_label: &'static str,
    pub completed_marker: &'static str,
    pub edit_action: &'static str,
    pub delete_action: &'static str,
    pub confirm_delete: &'static str,
    pub create_failed: &'static str,
    pub fetch_failed: &'static str,
    pub update_failed: &'static str,
    pub delete_failed: &'static str,
    pub timestamp_style: TimestampStyle,
}

pub const EN_TODO: Locale = Locale {
    empty_state: "No todos yet. Add one above!",
    load_failed: "Failed to load todos. Make sure the backend is running.",
    no_content: "No content",
    created_label: "Created",
    updated_label: "Updated",
    completed_marker: "✓ Completed",
    edit_action: "Edit",
    delete_action: "Delete",
    confirm_delete: "Are you sure you want to delete this todo?",
    create_failed: "Failed to create todo",
    fetch_failed: "Failed to load todo",
    update_failed: "Failed to update todo",
    delete_failed: "Failed to delete todo",
    timestamp_style: TimestampStyle::EnUs,
};

pub const KO_BLOG: Locale = Locale {
    empty_state: "아직 블로그 포스트가 없습니다. 첫 포스트를 작성해보세요!",
    load_failed: "블로그 포스트를 불러오지 못했습니다. 백엔드 서버가 실행 중인지 확인하세요.",
    no_content: "내용 없음",
    created_label: "작성일",
    updated_label: "수정일",
    completed_marker: "✓ 완료",
    edit_action: "수정",
    delete_action: "삭제",
    confirm_delete: "이 블로그 포스트를 삭제하시겠습니까?",
    create_failed: "블로그 포스트 작성에 실패했습니다.",
    fetch_failed: "블로그 포스트를 불러오지 못했습니다.",
    update_failed: "블로그 포스트 수정에 실패했습니다.",
    delete_failed: "블로그 포스트 삭제에 실패했습니다.",
    timestamp_style: TimestampStyle::KoKr,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindDescriptor {
    /// Short name used in logs.
    pub name: &'static str,
    /// Collection path segment under the API base.
    pub collection: &'static str,
    /// Prefix for the css classes of item blocks.
    pub css_prefix: &'static str,
    /// Append the "updated" timestamp when it differs from the creation time.
    pub shows_updated_at: bool,
    pub locale: &'static Locale,
}

/// Read-only view of a record used by the renderer.
pub trait ListRecord {
    fn id(&self) -> &RecordId;
    fn title(&self) -> &str;
    fn content(&self) -> Option<&str>;
    fn created_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> DateTime<Utc>;

    /// `None` for kinds without a completion flag.
    fn completed(&self) -> Option<bool> {
        None
    }

    /// `None` for kinds without tags.
    fn tags(&self) -> Option<&str> {
        None
    }
}

pub trait RecordKind: Send + Sync + 'static {
    type Record: ListRecord + DeserializeOwned + Clone + Debug + Send + Sync;
    /// Body of the create call.
    type Draft: Serialize + Debug + Send + Sync;
    /// Body of the update call; also the contents of a populated edit form.
    type Changes: Serialize + Clone + Debug + PartialEq + Send + Sync;

    const DESCRIPTOR: KindDescriptor;

    /// Populates an edit form from a freshly fetched record.
    fn edit_fields(record: &Self::Record) -> Self::Changes;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodoKind;

impl RecordKind for TodoKind {
    type Record = Todo;
    type Draft = NewTodo;
    type Changes = TodoChanges;

    const DESCRIPTOR: KindDescriptor = KindDescriptor {
        name: "todo",
        collection: "todos",
        css_prefix: "todo",
        shows_updated_at: false,
        locale: &EN_TODO,
    };

    fn edit_fields(record: &Todo) -> TodoChanges {
        TodoChanges {
            title: record.title.clone(),
            content: record.content.clone().unwrap_or_default(),
            completed: record.completed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlogKind;

impl RecordKind for BlogKind {
    type Record = BlogPost;
    type Draft = NewBlogPost;
    type Changes = BlogPostChanges;

    const DESCRIPTOR: KindDescriptor = KindDescriptor {
        name: "blog",
        collection: "blogs",
        css_prefix: "blog",
        shows_updated_at: true,
        locale: &KO_BLOG,
    };

    fn edit_fields(record: &BlogPost) -> BlogPostChanges {
        BlogPostChanges {
            title: record.title.clone(),
            content: record.content.clone().unwrap_or_default(),
            tags: record.tags.clone().unwrap_or_default(),
        }
    }
}

impl ListRecord for Todo {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn completed(&self) -> Option<bool> {
        Some(self.completed)
    }
}

impl ListRecord for BlogPost {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn tags(&self) -> Option<&str> {
        self.tags.as_deref()
    }
}
