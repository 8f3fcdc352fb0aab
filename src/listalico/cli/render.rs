use chrono::{DateTime, Utc};
use colored::{ColoredString, Colorize};
use listalico::api::{CmdMessage, MessageLevel};
use listalico::commands::import::ImportSummary;
use listalico::index::{DisplayFolder, DisplayNote, DisplayTrashedFolder, DisplayTrashedNote};
use listalico::model::{Note, Priority};
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 14;
const PRIORITY_WIDTH: usize = 8;
const FOLDER_DOT: &str = "●";

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => eprintln!("{}", message.content.yellow()),
            MessageLevel::Error => eprintln!("{}", message.content.red()),
        }
    }
}

/// One line per note: index, task box, title with a content preview, folder,
/// priority and age.
pub(super) fn render_note_list(notes: &[DisplayNote], total: usize) -> String {
    if notes.is_empty() {
        return if total == 0 {
            "No notes yet.\n".to_string()
        } else {
            "No notes found.\n".to_string()
        };
    }

    let mut out = String::new();
    for dn in notes {
        let idx_str = format!("{:>4}. ", dn.index.to_string());
        let folder = dn
            .folder_name
            .as_ref()
            .map(|name| format!(" ({})", name))
            .unwrap_or_default();
        out.push_str(&note_line(&idx_str, idx_str.normal(), &dn.note, &folder, dn.note.updated_at));
    }
    out
}

pub(super) fn render_trash(folders: &[DisplayTrashedFolder], notes: &[DisplayTrashedNote]) -> String {
    if folders.is_empty() && notes.is_empty() {
        return "Trash is empty.\n".to_string();
    }

    let mut out = String::new();
    if !folders.is_empty() {
        out.push_str(&format!("{}\n", "Folders:".bold()));
        for df in folders {
            let idx_str = format!("{:>4}. ", df.index.to_string());
            let time = format_time_ago(df.folder.deleted_at);
            let available = LINE_WIDTH.saturating_sub(idx_str.width() + TIME_WIDTH);
            let shown = truncate_to_width(&df.folder.folder.name, available.saturating_sub(2));
            let padding = available.saturating_sub(shown.width() + 2);
            out.push_str(&format!(
                "{}{} {}{}{}\n",
                idx_str.red(),
                color_dot(&df.folder.folder.color),
                shown,
                " ".repeat(padding),
                time.dimmed()
            ));
        }
    }
    if !notes.is_empty() {
        if !folders.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("{}\n", "Notes:".bold()));
        for dn in notes {
            let idx_str = format!("{:>4}. ", dn.index.to_string());
            out.push_str(&note_line(
                &idx_str,
                idx_str.red(),
                &dn.note.note,
                "",
                dn.note.deleted_at,
            ));
        }
    }
    out
}

/// Full view of notes, active ones first.
pub(super) fn render_full_notes(active: &[DisplayNote], trashed: &[DisplayTrashedNote]) -> String {
    let mut blocks: Vec<String> = Vec::new();
    for dn in active {
        blocks.push(full_note(
            dn.index.to_string().yellow(),
            &dn.note,
            dn.folder_name.as_deref(),
            None,
        ));
    }
    for dn in trashed {
        blocks.push(full_note(
            dn.index.to_string().red(),
            &dn.note.note,
            None,
            Some(dn.note.deleted_at),
        ));
    }
    blocks.join("\n================================\n\n")
}

fn full_note(
    index: ColoredString,
    note: &Note,
    folder: Option<&str>,
    deleted_at: Option<DateTime<Utc>>,
) -> String {
    let mut out = format!("{} {}\n", index, note.title.bold());
    out.push_str("--------------------------------\n");

    let mut meta: Vec<String> = Vec::new();
    if let Some(folder) = folder {
        meta.push(format!("folder: {}", folder));
    }
    if let Some(priority) = note.priority {
        meta.push(format!("priority: {}", priority));
    }
    if note.is_task {
        meta.push(format!(
            "task: {}",
            if note.completed { "done" } else { "open" }
        ));
    }
    if !note.categories.is_empty() {
        meta.push(format!("categories: {}", note.categories.join(", ")));
    }
    meta.push(format!(
        "updated: {}",
        note.updated_at.format("%Y-%m-%d %H:%M")
    ));
    if let Some(deleted_at) = deleted_at {
        meta.push(format!("trashed: {}", deleted_at.format("%Y-%m-%d %H:%M")));
    }
    out.push_str(&format!("{}\n", meta.join(" | ").dimmed()));

    if !note.content.is_empty() {
        out.push('\n');
        out.push_str(&note.content);
        out.push('\n');
    }
    out
}

pub(super) fn render_folder_list(folders: &[DisplayFolder], total_notes: usize) -> String {
    if folders.is_empty() {
        return "No folders.\n".to_string();
    }

    let name_width = folders
        .iter()
        .map(|df| df.folder.name.width())
        .max()
        .unwrap_or(0)
        .min(40);

    let mut out = String::new();
    for df in folders {
        let idx_str = format!("{:>4}. ", df.position);
        let name = truncate_to_width(&df.folder.name, name_width + 1);
        let padding = name_width.saturating_sub(name.width());
        out.push_str(&format!(
            "{}{} {}{}  {}\n",
            idx_str,
            color_dot(&df.folder.color),
            name,
            " ".repeat(padding),
            plural(df.note_count, "note").dimmed()
        ));
    }
    out.push_str(&format!("{}\n", format!("{} in total", plural(total_notes, "note")).dimmed()));
    out
}

pub(super) fn render_config(entries: &[(&str, String)]) -> String {
    entries
        .iter()
        .map(|(key, value)| format!("{} = {}\n", key, value))
        .collect()
}

pub(super) fn render_import_summary(summary: &ImportSummary) -> String {
    let mut out = String::from("Backup contents:\n");
    out.push_str(&format!("  {}\n", plural(summary.folders, "folder")));
    out.push_str(&format!("  {}\n", plural(summary.notes, "note")));
    out.push_str(&format!(
        "  {} and {} in the trash\n",
        plural(summary.deleted_folders, "folder"),
        plural(summary.deleted_notes, "note")
    ));
    if let Some(date) = summary.export_date {
        out.push_str(&format!("  exported {}\n", date.format("%Y-%m-%d %H:%M")));
    }
    if let (Some(app), Some(version)) = (&summary.app_name, &summary.version) {
        out.push_str(&format!("  by {} {}\n", app, version));
    }
    out
}

fn note_line(
    idx_str: &str,
    idx_colored: ColoredString,
    note: &Note,
    folder: &str,
    stamp: DateTime<Utc>,
) -> String {
    let task_box = match (note.is_task, note.completed) {
        (true, true) => "[x] ",
        (true, false) => "[ ] ",
        (false, _) => "",
    };

    let preview: String = note
        .content
        .chars()
        .take(50)
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect();
    let tags: String = note
        .categories
        .iter()
        .map(|c| format!(" #{}", c))
        .collect();
    let body = if preview.is_empty() {
        format!("{}{}{}{}", task_box, note.title, folder, tags)
    } else {
        format!("{}{}{}{} {}", task_box, note.title, folder, tags, preview)
    };

    let fixed_width = idx_str.width() + PRIORITY_WIDTH + TIME_WIDTH;
    let available = LINE_WIDTH.saturating_sub(fixed_width);
    let shown = truncate_to_width(&body, available);
    let padding = available.saturating_sub(shown.width());

    let shown = if note.is_task && note.completed {
        shown.dimmed().strikethrough()
    } else {
        shown.normal()
    };

    format!(
        "{}{}{}{}{}\n",
        idx_colored,
        shown,
        " ".repeat(padding),
        priority_badge(note.priority),
        format_time_ago(stamp).dimmed()
    )
}

fn priority_badge(priority: Option<Priority>) -> ColoredString {
    let label = priority.map(|p| p.to_string()).unwrap_or_default();
    let padded = format!("{:>width$}", label, width = PRIORITY_WIDTH);
    match priority {
        Some(Priority::High) => padded.red(),
        Some(Priority::Medium) => padded.yellow(),
        Some(Priority::Low) => padded.blue(),
        None => padded.normal(),
    }
}

fn color_dot(hex: &str) -> ColoredString {
    match parse_hex(hex) {
        Some((r, g, b)) => FOLDER_DOT.truecolor(r, g, b),
        None => FOLDER_DOT.normal(),
    }
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("1 {}", word)
    } else {
        format!("{} {}s", n, word)
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }
    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);

    let formatter = Formatter::new();
    let time_str = formatter.convert(duration.to_std().unwrap_or_default());

    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
