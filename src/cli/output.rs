//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::VaultItem;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a dim note to stderr, keeping stdout clean for piping.
pub fn note(msg: &str) {
    eprintln!("{}", style(msg).dim());
}

/// First block of a uuid, enough to address an item in most vaults.
pub fn short_id(item: &VaultItem) -> String {
    item.id().simple().to_string()[..8].to_string()
}

/// Print a table of items (Id, Type, Title, Username, Updated).
pub fn print_items_table(items: &[&VaultItem]) {
    if items.is_empty() {
        info("No matching items.");
        tip("Run `velano add <TITLE>` to add an item.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Type", "Title", "Username", "\u{2605}", "Updated"]);

    for item in items {
        table.add_row(vec![
            short_id(item),
            item.kind.to_string(),
            item.title.clone(),
            item.username.clone(),
            if item.favorite { "\u{2605}" } else { "" }.to_string(),
            item.updated_at().format("%Y-%m-%d %H:%M").to_string(),
        ]);
    }

    println!("{table}");
}

/// Print every field of one item.  The password is masked unless `reveal`.
pub fn print_item(item: &VaultItem, reveal: bool) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let password = if item.password.is_empty() {
        String::new()
    } else if reveal {
        item.password.clone()
    } else {
        "\u{2022}".repeat(8)
    };

    let rows: [(&str, String); 11] = [
        ("Id", item.id().to_string()),
        ("Type", item.kind.to_string()),
        ("Title", item.title.clone()),
        ("Username", item.username.clone()),
        ("Password", password),
        ("URL", item.url.clone()),
        ("Category", item.category.clone()),
        ("Tags", item.tags.join(", ")),
        ("Favorite", if item.favorite { "yes" } else { "no" }.to_string()),
        ("Created", item.created_at().format("%Y-%m-%d %H:%M:%S").to_string()),
        ("Updated", item.updated_at().format("%Y-%m-%d %H:%M:%S").to_string()),
    ];
    for (label, value) in rows {
        table.add_row(vec![label.to_string(), value]);
    }
    println!("{table}");

    if !item.notes.is_empty() {
        println!("{}", style("Notes").bold());
        println!("{}", item.notes);
    }
}
