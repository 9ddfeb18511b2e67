use std::fmt::Write;

use chrono::{DateTime, Utc};
use gist_core::{
    ellipsis, page_count, AppViewModel, DetailView, DraftView, GistRowView, ListSource, Notice,
    ScreenView, Severity,
};

const DESCRIPTION_LIMIT: usize = 80;
const PREVIEW_LINES: usize = 3;
const PREVIEW_LINE_LIMIT: usize = 100;

pub fn render(view: &AppViewModel) -> String {
    let mut out = String::new();
    if let Some(user) = &view.user {
        let _ = writeln!(out, "signed in as {user}");
    }
    match &view.screen {
        None => out.push_str("Nothing open. Try `public`, `mine` or `starred`.\n"),
        Some(ScreenView::List(source)) => render_list(&mut out, source, view),
        Some(ScreenView::Detail(id)) => match &view.detail {
            Some(detail) => render_detail(&mut out, detail),
            None if view.loading => {
                let _ = writeln!(out, "Loading gist {id}...");
            }
            None => {
                let _ = writeln!(out, "Gist {id} could not be loaded.");
            }
        },
        Some(ScreenView::Create) => render_draft(&mut out, &view.draft),
    }
    out
}

pub fn render_notice(notice: &Notice) -> String {
    let prefix = match notice.severity {
        Severity::Info => "info",
        Severity::Success => "ok",
        Severity::Warning => "warning",
        Severity::Error => "error",
    };
    format!("{prefix}: {}", notice.text)
}

/// RFC 3339 timestamp as `YYYY-MM-DD HH:MM` UTC; anything else is shown as given.
pub fn format_timestamp(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => parsed.with_timezone(&Utc).format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => raw.to_string(),
    }
}

fn render_list(out: &mut String, source: &ListSource, view: &AppViewModel) {
    let title = match source {
        ListSource::Search(query) => format!("search \"{query}\""),
        other => format!("{} gists", other.label()),
    };
    let page = if source.pages_on_server() {
        format!("page {}", view.page.page)
    } else {
        format!(
            "page {} of {}",
            view.page.page,
            page_count(view.total, view.page.per_page).max(1)
        )
    };
    let _ = write!(out, "== {title}, {page}");
    if !view.search_term.is_empty() {
        let _ = write!(out, ", filter \"{}\"", view.search_term);
    }
    out.push_str(" ==\n");

    if view.loading {
        out.push_str("Loading...\n");
        return;
    }
    if view.rows.is_empty() {
        out.push_str("No gists found.\n");
        return;
    }
    for row in &view.rows {
        render_row(out, row);
    }
}

fn render_row(out: &mut String, row: &GistRowView) {
    let _ = writeln!(
        out,
        "[{}] {}  {}  {}  {}",
        flags(row.starred, row.forked, row.owned),
        row.id,
        row.owner.as_deref().unwrap_or("anonymous"),
        row.updated_at.as_deref().map(format_timestamp).unwrap_or_default(),
        first_file_summary(row),
    );
    if !row.description.is_empty() {
        let _ = writeln!(out, "    {}", ellipsis(&row.description, DESCRIPTION_LIMIT));
    }
    if let Some(preview) = &row.preview {
        for line in preview.lines().take(PREVIEW_LINES) {
            let _ = writeln!(out, "    | {}", ellipsis(line, PREVIEW_LINE_LIMIT));
        }
    }
}

fn first_file_summary(row: &GistRowView) -> String {
    let Some(name) = &row.first_file else {
        return "(no files)".to_string();
    };
    let mut summary = match &row.language {
        Some(language) => format!("{name} ({language})"),
        None => name.clone(),
    };
    if row.file_count > 1 {
        let _ = write!(summary, " +{} more", row.file_count - 1);
    }
    summary
}

/// `*` starred, `F` forked this session, `M` mine.
fn flags(starred: bool, forked: bool, owned: bool) -> String {
    [(starred, '*'), (forked, 'F'), (owned, 'M')]
        .iter()
        .map(|(on, mark)| if *on { *mark } else { ' ' })
        .collect()
}

fn render_detail(out: &mut String, detail: &DetailView) {
    let _ = writeln!(
        out,
        "== gist {} by {} [{}] ==",
        detail.id,
        detail.owner.as_deref().unwrap_or("anonymous"),
        if detail.public { "public" } else { "secret" },
    );
    if !detail.description.is_empty() {
        let _ = writeln!(out, "{}", detail.description);
    }
    if let Some(url) = &detail.html_url {
        let _ = writeln!(out, "{url}");
    }
    if let Some(updated) = &detail.updated_at {
        let _ = writeln!(out, "updated {}", format_timestamp(updated));
    }
    let mut status = vec![if detail.starred { "starred" } else { "not starred" }];
    if detail.owned {
        status.push("yours");
    } else if detail.forked {
        status.push("forked");
    } else if detail.can_fork {
        status.push("can fork");
    }
    let _ = writeln!(out, "{}", status.join(", "));

    for file in &detail.files {
        let _ = writeln!(
            out,
            "\n--- {} ({}, {} bytes)",
            file.filename, file.language, file.size
        );
        match &file.content {
            Some(content) => {
                out.push_str(content);
                if !content.ends_with('\n') {
                    out.push('\n');
                }
            }
            None => out.push_str("(content unavailable)\n"),
        }
    }
}

fn render_draft(out: &mut String, draft: &DraftView) {
    out.push_str("== new gist ==\n");
    let _ = writeln!(
        out,
        "{} gist: {}",
        if draft.draft.public { "public" } else { "secret" },
        draft.draft.description
    );
    for file in draft.draft.files() {
        let _ = writeln!(out, "  {} ({} bytes)", file.filename, file.content.len());
    }
    if draft.submitting {
        out.push_str("Submitting...\n");
    }
    if let Some(id) = &draft.last_created {
        let _ = writeln!(out, "created {id}");
    }
}
