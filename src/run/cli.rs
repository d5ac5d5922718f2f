use anyhow::{Context as _, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};

use super::{flag_value, has_flag, positionals, shellexpand, Context};
use crate::categorize::{suggest_rule, Categorizer};
use crate::format::{format_money, progress_bar, truncate};
use crate::import::{CsvImporter, RestorePayload};
use crate::models::{
    coerce_amount, Cadence, EntryDraft, EntryKind, ImportRule, MoneyEntry, UNCATEGORIZED,
};

const RULE: usize = 60;

/// Run one command. `args[0]` is the command name; no command prints the
/// dashboard.
pub(crate) fn as_cli(args: &[String], ctx: &mut Context) -> Result<()> {
    let Some(command) = args.first() else {
        return cli_summary(ctx);
    };
    let rest = &args[1..];
    match command.as_str() {
        "add-income" => cli_add(rest, EntryKind::Income, ctx),
        "add-expense" => cli_add(rest, EntryKind::Expense, ctx),
        "list" | "ls" => cli_list(rest, ctx),
        "delete" | "rm" => cli_delete(rest, ctx),
        "summary" | "s" => cli_summary(ctx),
        "upcoming" => cli_upcoming(rest, ctx),
        "history" => cli_history(ctx),
        "budget" => cli_budget(rest, ctx),
        "rule" => cli_rule(rest, ctx),
        "import" => cli_import(rest, ctx),
        "restore" => cli_restore(rest, ctx),
        "export" => cli_export(rest, ctx),
        "wipe" => cli_wipe(rest, ctx),
        "config" => cli_config(rest, ctx),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("budgetbuddy {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("BudgetBuddy: monthly income, expenses and budget caps");
    println!();
    println!("Usage: budgetbuddy [--as-of YYYY-MM-DD] [command]");
    println!();
    println!("Commands:");
    println!("  (none), summary               Monthly dashboard");
    println!("  add-income <name> <amount>    Add an income entry");
    println!("  add-expense <name> <amount>   Add an expense entry");
    println!("    --cadence <c>               oneoff, weekly, biweekly, monthly (default), yearly");
    println!("    --category <name>           Expense category (default: {UNCATEGORIZED})");
    println!("    --date <YYYY-MM-DD>         Due or paid date");
    println!("  list [income|expenses]        List entries, newest first");
    println!("  delete <id>                   Delete an entry");
    println!("  upcoming [--days N]           Entries due in the next N days");
    println!("  history                       One-off entries dated this month");
    println!("  budget                        Budget progress by category");
    println!("  budget set <category> <amt>   Set a monthly cap");
    println!("  budget rm <category>          Remove a cap");
    println!("  rule                          List import rules");
    println!("  rule add <pattern> <category> Add a rule (--regex, --priority N)");
    println!("  rule rm <id>                  Delete a rule");
    println!("  import <file.csv>             Import entries from CSV");
    println!("    --kind <income|expense>     Kind for files without a type column");
    println!("  restore <file.json>           Restore an exported backup");
    println!("  export [path]                 Export to JSON, or CSV for *.csv paths");
    println!("  wipe --yes                    Delete all entries (caps are kept)");
    println!("  config [set <key> <value>]    Show or change settings");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
}

fn money(ctx: &Context, amount: Decimal) -> String {
    format_money(amount, &ctx.config.currency_symbol)
}

fn date_label(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "-".into())
}

// ── Entries ───────────────────────────────────────────────────

fn cli_add(args: &[String], kind: EntryKind, ctx: &mut Context) -> Result<()> {
    let pos = positionals(args, &["--cadence", "--category", "--date"]);
    let [name, amount, ..] = pos.as_slice() else {
        anyhow::bail!("Usage: budgetbuddy add-{kind} <name> <amount> [--cadence <c>] [--category <name>] [--date <YYYY-MM-DD>]");
    };

    let mut draft = EntryDraft::new(kind, name, amount);
    if let Some(cadence) = flag_value(args, "--cadence") {
        if Cadence::parse(cadence) == Cadence::Unknown {
            let known: Vec<&str> = Cadence::all().iter().map(Cadence::as_str).collect();
            eprintln!(
                "Warning: unknown cadence '{cadence}' will not count toward monthly totals (expected one of: {})",
                known.join(", ")
            );
        }
        draft.cadence = cadence.to_string();
    }
    draft.category = flag_value(args, "--category").map(str::to_string);
    draft.date = flag_value(args, "--date").map(str::to_string);

    match ctx.session.add_entry(draft)? {
        Some(entry) => println!(
            "Added {kind} '{}' {} {} [{}]",
            entry.name,
            money(ctx, entry.amount),
            entry.cadence,
            entry.id
        ),
        None => println!("Nothing saved: a name and a non-zero amount are required"),
    }
    Ok(())
}

fn print_entries(ctx: &Context, title: &str, entries: &[MoneyEntry]) {
    println!("{title} ({})", entries.len());
    println!("{}", "─".repeat(RULE));
    if entries.is_empty() {
        println!("  (none)");
        return;
    }
    for e in entries {
        let category = e.category.as_ref().map_or("", |c| c.as_str());
        println!(
            "  {:<32} {:<20} {:>12} {:<9} {:<14} {}",
            e.id.as_str(),
            truncate(&e.name, 20),
            money(ctx, e.amount),
            e.cadence.as_str(),
            truncate(category, 14),
            date_label(e.date),
        );
    }
}

fn cli_list(args: &[String], ctx: &mut Context) -> Result<()> {
    let which = args.first().map(|s| s.to_lowercase());
    let snapshot = ctx.session.snapshot();
    match which.as_deref() {
        None => {
            print_entries(ctx, "Income", &snapshot.income);
            println!();
            print_entries(ctx, "Expenses", &snapshot.expenses);
        }
        Some(raw) => {
            let Some(kind) = EntryKind::parse(raw) else {
                anyhow::bail!("Usage: budgetbuddy list [income|expenses]");
            };
            let title = match kind {
                EntryKind::Income => "Income",
                EntryKind::Expense => "Expenses",
            };
            print_entries(ctx, title, snapshot.entries(kind));
        }
    }
    Ok(())
}

fn cli_delete(args: &[String], ctx: &mut Context) -> Result<()> {
    let Some(id) = args.first() else {
        anyhow::bail!("Usage: budgetbuddy delete <id>");
    };
    match ctx.session.delete_entry(id)? {
        Some(entry) => println!("Deleted {} '{}'", entry.kind, entry.name),
        None => anyhow::bail!("No entry with id '{id}'"),
    }
    Ok(())
}

// ── Reports ───────────────────────────────────────────────────

fn cli_summary(ctx: &mut Context) -> Result<()> {
    let agg = ctx.session.aggregator();
    let summary = agg.summary();

    println!("BudgetBuddy  {}", agg.today().format("%B %Y"));
    println!("{}", "─".repeat(RULE));
    println!("  Income:     {:>14}", money(ctx, summary.income));
    println!("  Expenses:   {:>14}", money(ctx, summary.expenses));
    println!("  Net:        {:>14}", money(ctx, summary.net));
    println!("  Entries:    {:>14}", ctx.session.db().get_entry_count()?);

    let progress = agg.progress_all();
    if !progress.is_empty() {
        println!();
        println!("Spending by Category:");
        for p in &progress {
            let cap = if p.has_cap() {
                format!("of {}", money(ctx, p.cap))
            } else {
                String::new()
            };
            println!(
                "  {:<24} {:>14} {cap}",
                truncate(p.category.as_str(), 24),
                money(ctx, p.spent)
            );
        }
    }

    let window = ctx.config.upcoming_window_days;
    let due = agg.upcoming(window);
    if !due.is_empty() {
        println!();
        println!("Due in the next {window} days:");
        for e in due {
            println!(
                "  {}  {:<24} {:>14}  {}",
                date_label(e.date),
                truncate(&e.name, 24),
                money(ctx, e.amount),
                e.kind
            );
        }
    }
    Ok(())
}

fn cli_upcoming(args: &[String], ctx: &mut Context) -> Result<()> {
    let window = match flag_value(args, "--days") {
        Some(raw) => raw
            .parse::<u32>()
            .with_context(|| format!("--days expects a whole number, got '{raw}'"))?,
        None => ctx.config.upcoming_window_days,
    };
    let agg = ctx.session.aggregator();
    let due = agg.upcoming(window);

    println!("Upcoming ({window} days from {})", agg.today());
    println!("{}", "─".repeat(RULE));
    if due.is_empty() {
        println!("  Nothing due");
        return Ok(());
    }
    for e in due {
        let sign = if e.is_income() { '+' } else { '-' };
        println!(
            "  {}  {:<8} {:<24} {sign}{:>14}",
            date_label(e.date),
            e.kind.as_str(),
            truncate(&e.name, 24),
            money(ctx, e.amount)
        );
    }
    Ok(())
}

fn cli_history(ctx: &mut Context) -> Result<()> {
    let agg = ctx.session.aggregator();
    let items = agg.this_month_one_offs();

    println!("One-off items, {}", agg.today().format("%B %Y"));
    println!("{}", "─".repeat(RULE));
    if items.is_empty() {
        println!("  No one-off items logged this month");
        return Ok(());
    }
    for e in items {
        println!(
            "  {}  {:<8} {:<24} {:>14}",
            date_label(e.date),
            e.kind.as_str(),
            truncate(&e.name, 24),
            money(ctx, e.amount)
        );
    }
    Ok(())
}

// ── Budgets ───────────────────────────────────────────────────

fn cli_budget(args: &[String], ctx: &mut Context) -> Result<()> {
    match args.first().map(String::as_str) {
        None | Some("list") => cli_budget_list(ctx),
        Some("set") => {
            let (Some(category), Some(raw)) = (args.get(1), args.get(2)) else {
                anyhow::bail!("Usage: budgetbuddy budget set <category> <amount>");
            };
            let amount = coerce_amount(raw);
            let existed = ctx.session.snapshot().caps.contains(category);
            let key = ctx.session.set_cap(category, amount)?;
            let cap = ctx.session.snapshot().caps.cap_for(&key);
            let verb = if existed { "updated to" } else { "set to" };
            println!("Cap for {key} {verb} {}", money(ctx, cap));
            Ok(())
        }
        Some("rm") | Some("remove") => {
            let Some(category) = args.get(1) else {
                anyhow::bail!("Usage: budgetbuddy budget rm <category>");
            };
            let was = ctx.session.snapshot().caps.get(category);
            if ctx.session.remove_cap(category)? {
                println!("Removed cap for {category} (was {})", money(ctx, was));
                Ok(())
            } else {
                anyhow::bail!("No cap set for '{category}'");
            }
        }
        Some(other) => anyhow::bail!("Unknown budget command: {other}"),
    }
}

fn cli_budget_list(ctx: &mut Context) -> Result<()> {
    let agg = ctx.session.aggregator();
    let progress = agg.progress_all();
    println!("Budgets, {}", agg.today().format("%B %Y"));
    println!("{}", "─".repeat(RULE));
    if progress.is_empty() {
        println!("  No caps or spending yet");
        return Ok(());
    }
    if ctx.session.snapshot().caps.is_empty() {
        println!("  No caps set. Add one with: budgetbuddy budget set <category> <amount>");
    }
    for p in &progress {
        let cap = if p.has_cap() {
            money(ctx, p.cap)
        } else {
            "no cap".to_string()
        };
        let flag = if p.over {
            "  OVER".to_string()
        } else if p.has_cap() {
            format!("  {} left", money(ctx, p.remaining()))
        } else {
            String::new()
        };
        println!(
            "  {:<20} {:>12} / {:>12} {} {:>3}%{flag}",
            truncate(p.category.as_str(), 20),
            money(ctx, p.spent),
            cap,
            progress_bar(p.percent, 10),
            p.percent
        );
    }
    Ok(())
}

// ── Rules ─────────────────────────────────────────────────────

fn cli_rule(args: &[String], ctx: &mut Context) -> Result<()> {
    let db = ctx.session.db();
    match args.first().map(String::as_str) {
        None | Some("list") => {
            let rules = db.get_import_rules()?;
            if rules.is_empty() {
                println!("No import rules");
                return Ok(());
            }
            println!("{:<4} {:<8} {:<5} {:<24} Category", "ID", "Priority", "Kind", "Pattern");
            println!("{}", "─".repeat(RULE));
            for r in &rules {
                println!(
                    "{:<4} {:<8} {:<5} {:<24} {}",
                    r.id.unwrap_or(0),
                    r.priority,
                    if r.is_regex { "regex" } else { "text" },
                    truncate(&r.pattern, 24),
                    r.category
                );
            }
            Ok(())
        }
        Some("add") => {
            let rest = &args[1..];
            let pos = positionals(rest, &["--priority"]);
            let [pattern, category, ..] = pos.as_slice() else {
                anyhow::bail!("Usage: budgetbuddy rule add <pattern> <category> [--regex] [--priority N]");
            };
            let priority = match flag_value(rest, "--priority") {
                Some(raw) => raw
                    .parse::<i32>()
                    .with_context(|| format!("--priority expects a number, got '{raw}'"))?,
                None => 0,
            };
            let rule = if has_flag(rest, "--regex") {
                regex::RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .with_context(|| format!("Invalid regex: {pattern}"))?;
                ImportRule::new_regex(pattern.to_string(), category)
            } else {
                ImportRule::new_contains(pattern.to_string(), category)
            }
            .with_priority(priority);
            let id = db.insert_import_rule(&rule)?;
            println!("Added rule {id}: '{}' → {}", rule.pattern, rule.category);
            Ok(())
        }
        Some("rm") | Some("remove") => {
            let id: i64 = args
                .get(1)
                .context("Usage: budgetbuddy rule rm <id>")?
                .parse()
                .context("Rule id must be a number")?;
            if db.delete_import_rule(id)? {
                println!("Deleted rule {id}");
                Ok(())
            } else {
                anyhow::bail!("No rule with id {id}");
            }
        }
        Some(other) => anyhow::bail!("Unknown rule command: {other}"),
    }
}

// ── Import / export ───────────────────────────────────────────

fn existing_file(arg: Option<&String>, usage: &str) -> Result<PathBuf> {
    let Some(raw) = arg else {
        anyhow::bail!("Usage: {usage}");
    };
    let path = PathBuf::from(shellexpand(raw));
    if !path.exists() {
        anyhow::bail!("File not found: {raw}");
    }
    Ok(path)
}

fn cli_import(args: &[String], ctx: &mut Context) -> Result<()> {
    let pos = positionals(args, &["--kind"]);
    let path = existing_file(
        pos.first().map(|s| s.to_string()).as_ref(),
        "budgetbuddy import <file.csv> [--kind income|expense]",
    )?;
    let default_kind = match flag_value(args, "--kind") {
        Some(raw) => EntryKind::parse(raw)
            .with_context(|| format!("--kind must be income or expense, got '{raw}'"))?,
        None => EntryKind::Expense,
    };

    let mut import = CsvImporter::load(&path, default_kind, ctx.session.clock().now())?;
    println!(
        "Parsed {} entries ({} rows skipped)",
        import.entries.len(),
        import.skipped
    );

    let rules = ctx.session.db().get_import_rules()?;
    if !rules.is_empty() {
        let (categorizer, bad_patterns) = Categorizer::new(&rules);
        if !bad_patterns.is_empty() {
            eprintln!(
                "Warning: invalid regex rule(s): {}",
                bad_patterns.join(", ")
            );
        }
        let assigned = categorizer.categorize_batch(&mut import.entries);
        println!("Auto-categorized {assigned} expenses");
    }

    let count = ctx.session.import_entries(&import.entries)?;
    let dupes = import.entries.len() - count;
    println!("Imported {count} new entries ({dupes} duplicates skipped)");

    let mut suggestions: Vec<String> = import
        .entries
        .iter()
        .filter(|e| e.is_expense() && e.category.as_ref().is_some_and(|c| c.is_uncategorized()))
        .map(|e| suggest_rule(&e.name))
        .collect();
    suggestions.sort();
    suggestions.dedup();
    if !suggestions.is_empty() {
        println!("Suggested rules:");
        for s in suggestions.iter().take(3) {
            println!("  budgetbuddy rule add \"{s}\" <category>");
        }
    }
    Ok(())
}

fn cli_restore(args: &[String], ctx: &mut Context) -> Result<()> {
    let path = existing_file(args.first(), "budgetbuddy restore <file.json>")?;
    let restore = RestorePayload::load(&path)?.into_restore(ctx.session.clock().now());

    let count = ctx.session.import_entries(&restore.entries)?;
    for (category, amount) in &restore.caps {
        ctx.session.set_cap(category, *amount)?;
    }
    println!(
        "Restored {count} entries ({} already present, {} invalid) and {} caps",
        restore.entries.len() - count,
        restore.skipped,
        restore.caps.len()
    );
    Ok(())
}

fn cli_export(args: &[String], ctx: &mut Context) -> Result<()> {
    let now = ctx.session.clock().now();
    let output = args
        .first()
        .filter(|a| !a.starts_with('-'))
        .map(|a| shellexpand(a))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            format!("{home}/budgetbuddy-export-{}.json", now.format("%Y-%m-%d"))
        });

    let count = crate::export::export_to_path(ctx.session.snapshot(), Path::new(&output), now)?;
    println!("Exported {count} entries to {output}");
    Ok(())
}

fn cli_wipe(args: &[String], ctx: &mut Context) -> Result<()> {
    if !has_flag(args, "--yes") {
        anyhow::bail!("This deletes every income and expense entry. Re-run with --yes to confirm.");
    }
    let removed = ctx.session.wipe()?;
    println!("Wiped {removed} entries (budget caps kept)");
    Ok(())
}

// ── Config ────────────────────────────────────────────────────

fn cli_config(args: &[String], ctx: &mut Context) -> Result<()> {
    match args.first().map(String::as_str) {
        None | Some("show") => {
            let c = &ctx.config;
            println!("Config file:  {}", ctx.config_manager.path().display());
            println!("{}", "─".repeat(RULE));
            println!("  currency    {}", c.currency_symbol);
            println!("  window      {} days", c.upcoming_window_days);
            println!(
                "  database    {}",
                c.database_path
                    .as_ref()
                    .map_or_else(|| "(default)".to_string(), |p| p.display().to_string())
            );
            Ok(())
        }
        Some("set") => {
            let (Some(key), Some(value)) = (args.get(1), args.get(2)) else {
                anyhow::bail!("Usage: budgetbuddy config set <currency|window|database> <value>");
            };
            ctx.config.set(key, value)?;
            ctx.config_manager.save(&ctx.config)?;
            println!("Set {key} = {value}");
            Ok(())
        }
        Some(other) => anyhow::bail!("Unknown config command: {other}"),
    }
}
