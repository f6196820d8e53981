//! View renderer: record lists to HTML fragments.
//!
//! Rendering is pure. Every user-supplied string passes through [`escape_html`] before it
//! reaches the fragment, including record ids placed in attributes.

use std::fmt::{self, Write as _};

use chrono::{DateTime, FixedOffset, Offset, Timelike, Utc};

use crate::kind::{KindDescriptor, ListRecord, TimestampStyle};

const META_SEPARATOR: &str = " • ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Empty,
    Items { count: usize },
    LoadFailed,
}

/// A complete replacement for the item list container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    html: String,
    state: ViewState,
}

impl Fragment {
    pub fn as_str(&self) -> &str {
        &self.html
    }

    pub fn into_string(self) -> String {
        self.html
    }

    pub fn state(&self) -> ViewState {
        self.state
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.html)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Offset timestamps are displayed in.
    pub offset: FixedOffset,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }
}

impl RenderOptions {
    pub fn with_offset_minutes(minutes: i32) -> Option<Self> {
        let offset = FixedOffset::east_opt(minutes.checked_mul(60)?)?;
        Some(Self { offset })
    }
}

/// Converts text to its literal display form.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Splits comma-separated tag text into trimmed, non-empty labels, keeping order and
/// duplicates.
pub fn parse_tags(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .collect()
}

pub fn format_timestamp(at: DateTime<Utc>, style: TimestampStyle, offset: FixedOffset) -> String {
    let local = at.with_timezone(&offset);
    match style {
        TimestampStyle::EnUs => local.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string(),
        TimestampStyle::KoKr => {
            let (is_pm, _) = local.hour12();
            let meridiem = if is_pm { "오후" } else { "오전" };
            format!(
                "{} {meridiem} {}",
                local.format("%Y. %-m. %-d."),
                local.format("%-I:%M:%S")
            )
        }
    }
}

pub fn render_items<R: ListRecord>(
    descriptor: &KindDescriptor,
    records: &[R],
    options: &RenderOptions,
) -> Fragment {
    if records.is_empty() {
        return Fragment {
            html: placeholder(descriptor.locale.empty_state),
            state: ViewState::Empty,
        };
    }

    let blocks: Vec<String> = records
        .iter()
        .map(|record| render_block(descriptor, record, options))
        .collect();

    Fragment {
        html: blocks.join("\n"),
        state: ViewState::Items {
            count: records.len(),
        },
    }
}

/// Persistent inline placeholder shown when the list could not be loaded.
pub fn render_load_failure(descriptor: &KindDescriptor) -> Fragment {
    Fragment {
        html: placeholder(descriptor.locale.load_failed),
        state: ViewState::LoadFailed,
    }
}

fn placeholder(message: &str) -> String {
    format!(r#"<div class="empty-state">{}</div>"#, escape_html(message))
}

fn render_block<R: ListRecord>(
    descriptor: &KindDescriptor,
    record: &R,
    options: &RenderOptions,
) -> String {
    let locale = descriptor.locale;
    let prefix = descriptor.css_prefix;
    let id = escape_html(record.id().as_str());
    let completed = record.completed().unwrap_or(false);

    let content = match record.content() {
        Some(text) if !text.is_empty() => text,
        _ => locale.no_content,
    };

    let mut meta = format!(
        "{}: {}",
        locale.created_label,
        format_timestamp(record.created_at(), locale.timestamp_style, options.offset)
    );
    if descriptor.shows_updated_at && record.updated_at() != record.created_at() {
        let _ = write!(
            meta,
            "{META_SEPARATOR}{}: {}",
            locale.updated_label,
            format_timestamp(record.updated_at(), locale.timestamp_style, options.offset)
        );
    }
    if completed {
        let _ = write!(meta, "{META_SEPARATOR}{}", locale.completed_marker);
    }

    let mut html = String::new();
    let modifier = if completed { " completed" } else { "" };
    let _ = writeln!(html, r#"<div class="{prefix}-item{modifier}" data-id="{id}">"#);
    let _ = writeln!(html, "  <h3>{}</h3>", escape_html(record.title()));

    let tags = record.tags().map(parse_tags).unwrap_or_default();
    if !tags.is_empty() {
        let spans: String = tags
            .iter()
            .map(|tag| format!(r#"<span class="tag">{}</span>"#, escape_html(tag)))
            .collect();
        let _ = writeln!(html, r#"  <div class="{prefix}-tags">{spans}</div>"#);
    }

    let _ = writeln!(
        html,
        r#"  <p class="{prefix}-content">{}</p>"#,
        escape_html(content)
    );
    let _ = writeln!(html, r#"  <div class="{prefix}-meta">{}</div>"#, escape_html(&meta));
    let _ = writeln!(html, r#"  <div class="{prefix}-actions">"#);
    let _ = writeln!(
        html,
        r#"    <button class="btn-edit" data-action="edit" data-id="{id}">{}</button>"#,
        escape_html(locale.edit_action)
    );
    let _ = writeln!(
        html,
        r#"    <button class="btn-delete" data-action="delete" data-id="{id}">{}</button>"#,
        escape_html(locale.delete_action)
    );
    html.push_str("  </div>\n</div>");
    html
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
