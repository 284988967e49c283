use clap::builder::styling::{AnsiColor, Color, Style};
use clap::builder::Styles;
use crossterm::style::{Attribute, Stylize};
use unicode_width::UnicodeWidthStr;

use crm_notification_feed::notifications::Notification;
use crm_notification_feed::store::{Toast, ToastKind};
use crm_notification_feed::FeedView;

// ═══════════════════════════════════════════════════════════════════════════════
// Clap Styles
// ═══════════════════════════════════════════════════════════════════════════════

pub fn get_styles() -> Styles {
    let cyan = Style::new()
        .bold()
        .underline()
        .fg_color(Some(Color::Ansi(AnsiColor::Cyan)));
    let green = Style::new()
        .bold()
        .fg_color(Some(Color::Ansi(AnsiColor::Green)));
    let red = Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::Red)));

    Styles::styled()
        .usage(cyan)
        .header(cyan)
        .literal(green)
        .valid(green)
        .invalid(red)
        .error(red)
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack))))
}

pub mod colors {
    use crossterm::style::Color;

    pub const CYAN: Color = Color::Rgb {
        r: 0,
        g: 200,
        b: 220,
    };
    pub const GREEN: Color = Color::Rgb {
        r: 0,
        g: 220,
        b: 120,
    };
    pub const ORANGE: Color = Color::Rgb {
        r: 255,
        g: 165,
        b: 0,
    };
    pub const RED: Color = Color::Rgb {
        r: 255,
        g: 85,
        b: 85,
    };
    pub const BLUE: Color = Color::Rgb {
        r: 100,
        g: 149,
        b: 237,
    };
    pub const DIM: Color = Color::Rgb {
        r: 128,
        g: 128,
        b: 128,
    };
    pub const WHITE: Color = Color::Rgb {
        r: 255,
        g: 255,
        b: 255,
    };
}

mod glyphs {
    pub const TOP_LEFT: &str = "╭";
    pub const TOP_RIGHT: &str = "╮";
    pub const BOTTOM_LEFT: &str = "╰";
    pub const BOTTOM_RIGHT: &str = "╯";
    pub const HORIZONTAL: &str = "─";
    pub const VERTICAL: &str = "│";
    pub const T_TOP: &str = "┬";
    pub const T_BOTTOM: &str = "┴";
    pub const T_LEFT: &str = "├";
    pub const T_RIGHT: &str = "┤";
    pub const CROSS: &str = "┼";

    pub const UNREAD: &str = "●";
    pub const READ: &str = "○";
    pub const CHECK: &str = "✓";
    pub const CROSS_MARK: &str = "✗";
}

/// Longest title shown in the list table before it is cut.
const MAX_TITLE_WIDTH: usize = 40;

// ═══════════════════════════════════════════════════════════════════════════════
// Status lines
// ═══════════════════════════════════════════════════════════════════════════════

pub fn print_success(message: &str) {
    println!(
        " {} {}",
        glyphs::CHECK.with(colors::GREEN).bold(),
        message.with(colors::GREEN)
    );
}

pub fn print_error(message: &str) {
    println!(
        " {} {}",
        glyphs::CROSS_MARK.with(colors::RED).bold(),
        message.with(colors::RED)
    );
}

pub fn print_warning(message: &str) {
    println!(
        " {} {}",
        "⚠".with(colors::ORANGE).bold(),
        message.with(colors::ORANGE)
    );
}

pub fn print_info(message: &str) {
    println!(
        " {} {}",
        "ℹ".with(colors::BLUE).bold(),
        message.with(colors::BLUE)
    );
}

pub fn print_key_value(key: &str, value: &str) {
    println!(
        "  {} {}",
        format!("{}:", key).with(colors::DIM),
        value.with(colors::WHITE)
    );
}

pub fn get_prompt(unread: Option<u64>) -> String {
    match unread {
        Some(0) | None => format!("{} ", "notifications ❯".with(colors::CYAN).bold()),
        Some(count) => format!(
            "{} {} ",
            format!("({})", badge_label(count)).with(colors::RED).bold(),
            "notifications ❯".with(colors::CYAN).bold()
        ),
    }
}

/// Badge text, capped the way the header bell shows it.
pub fn badge_label(count: u64) -> String {
    if count > 99 {
        "99+".to_string()
    } else {
        count.to_string()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Feed rendering
// ═══════════════════════════════════════════════════════════════════════════════

pub fn print_feed(view: &FeedView) {
    if view.is_loading {
        print_info("Loading notifications...");
        return;
    }
    if view.is_empty() {
        println!(
            "  {} {}",
            glyphs::READ.with(colors::DIM),
            "No notifications".with(colors::DIM).attribute(Attribute::Italic)
        );
        return;
    }

    print_notifications(&view.items);

    let total = view
        .total
        .map(|t| t.to_string())
        .unwrap_or_else(|| "?".to_string());
    println!(
        "  {}",
        format!(
            "{} shown, {} unread, {} total, filter {}",
            view.items.len(),
            view.unread_count(),
            total,
            view.filter
        )
        .with(colors::DIM)
    );
    if view.is_fetching {
        print_info("Loading more...");
    } else if view.end_reached() {
        println!(
            "  {}",
            "No more notifications"
                .with(colors::DIM)
                .attribute(Attribute::Italic)
        );
    }
}

pub fn print_notifications(items: &[Notification]) {
    let mut table = TableBuilder::new(vec!["", "ID", "TYPE", "TITLE", "RECEIVED"]);
    for n in items {
        let marker = if n.is_read {
            glyphs::READ
        } else {
            glyphs::UNREAD
        };
        table.add_row(vec![
            marker.to_string(),
            n.id.clone(),
            n.notification_type.to_string(),
            truncate(&n.title, MAX_TITLE_WIDTH),
            n.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ]);
    }
    table.print();
}

pub fn print_notification_detail(n: &Notification) {
    println!();
    println!("  {}", n.title.as_str().with(colors::WHITE).bold());
    println!("  {}", n.message.as_str().with(colors::WHITE));
    print_key_value("Type", n.notification_type.as_str());
    print_key_value("Received", &n.created_at.to_rfc3339());
    if let Some(link) = &n.link {
        print_key_value("Link", link);
    }
    println!();
}

pub fn print_toasts(toasts: &[Toast]) {
    if toasts.is_empty() {
        print_info("No toasts");
        return;
    }
    for toast in toasts {
        let line = format!("#{} {}", toast.id, toast.message);
        match toast.kind {
            ToastKind::Info => print_info(&line),
            ToastKind::Success => print_success(&line),
            ToastKind::Error => print_error(&line),
        }
    }
}

fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut width = 0;
    for c in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if width + w + 1 > max_width {
            break;
        }
        width += w;
        out.push(c);
    }
    out.push('…');
    out
}

struct TableBuilder {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    col_widths: Vec<usize>,
}

impl TableBuilder {
    fn new(headers: Vec<&str>) -> Self {
        TableBuilder {
            col_widths: headers.iter().map(|h| h.width()).collect(),
            headers: headers.into_iter().map(String::from).collect(),
            rows: Vec::new(),
        }
    }

    fn add_row(&mut self, row: Vec<String>) {
        for (width, cell) in self.col_widths.iter_mut().zip(&row) {
            *width = (*width).max(cell.width());
        }
        self.rows.push(row);
    }

    fn border(&self, left: &str, join: &str, right: &str) {
        let segments: Vec<String> = self
            .col_widths
            .iter()
            .map(|w| glyphs::HORIZONTAL.repeat(w + 2))
            .collect();
        println!(
            "{}",
            format!("{}{}{}", left, segments.join(join), right).with(colors::CYAN)
        );
    }

    fn line(&self, cells: &[String], header: bool) {
        print!("{}", glyphs::VERTICAL.with(colors::CYAN));
        for (cell, width) in cells.iter().zip(&self.col_widths) {
            let padding = " ".repeat(width.saturating_sub(cell.width()));
            if header {
                print!(" {}{} ", cell.as_str().with(colors::CYAN).bold(), padding);
            } else {
                print!(" {}{} ", cell.as_str().with(colors::WHITE), padding);
            }
            print!("{}", glyphs::VERTICAL.with(colors::CYAN));
        }
        println!();
    }

    fn print(&self) {
        self.border(glyphs::TOP_LEFT, glyphs::T_TOP, glyphs::TOP_RIGHT);
        self.line(&self.headers, true);
        self.border(glyphs::T_LEFT, glyphs::CROSS, glyphs::T_RIGHT);
        for row in &self.rows {
            self.line(row, false);
        }
        self.border(glyphs::BOTTOM_LEFT, glyphs::T_BOTTOM, glyphs::BOTTOM_RIGHT);
    }
}
