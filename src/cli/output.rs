use ansi_term::{Colour, Style};
use chrono::NaiveDate;

use crate::{
    domain::{Category, CategoryOverrides},
    ledger::entities::Ledger,
    stats::{DaySummary, TimeStats},
    utils::{percentage::time_share, time::day_key},
};

pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = seconds / 60 % 60;
    let seconds = seconds % 60;
    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}

fn category_style(category: Category) -> Style {
    match category {
        Category::Productive => Colour::Green.normal(),
        Category::Neutral => Colour::Yellow.normal(),
        Category::Distracting => Colour::Red.normal(),
    }
}

fn painted(category: Category) -> String {
    category_style(category).paint(category.as_str()).to_string()
}

fn summary_lines(summary: &DaySummary) -> Vec<String> {
    let mut lines = vec![format!("Total\t{}", format_duration(summary.total_time))];
    for (category, seconds) in [
        (Category::Productive, summary.productive),
        (Category::Neutral, summary.neutral),
        (Category::Distracting, summary.distracting),
    ] {
        lines.push(format!(
            "{}\t{}\t{}",
            painted(category),
            format_duration(seconds),
            time_share(seconds, summary.total_time)
        ));
    }
    lines
}

pub fn render_stats(stats: &TimeStats) -> String {
    let bold = Style::new().bold();
    let mut lines = vec![bold.paint("Today").to_string()];
    lines.extend(summary_lines(&stats.today));

    lines.push(String::new());
    lines.push(
        bold.paint(format!("Top domains ({} tracked)", stats.total_domains))
            .to_string(),
    );
    for ranking in &stats.top_domains {
        lines.push(format!(
            "{}\t{}\t{} today\t{} visits\t{}",
            format_duration(ranking.total_time),
            painted(ranking.category),
            format_duration(ranking.today_time),
            ranking.visit_count,
            ranking.domain
        ));
    }

    lines.push(String::new());
    lines.push(bold.paint("Last 7 days").to_string());
    for day in &stats.week_stats {
        let summary = DaySummary::from(&day.record);
        lines.push(format!(
            "{}\t{}\t{} productive\t{} distracting",
            day.date,
            format_duration(summary.total_time),
            time_share(summary.productive, summary.total_time),
            time_share(summary.distracting, summary.total_time)
        ));
    }
    lines.join("\n")
}

/// Breakdown of a single day, domains with the most time first.
pub fn render_day(ledger: &Ledger, date: NaiveDate) -> String {
    let key = day_key(date);
    let Some(day) = ledger.days.get(&key) else {
        return format!("No activity recorded on {key}");
    };

    let mut lines = vec![Style::new().bold().paint(key).to_string()];
    lines.extend(summary_lines(&DaySummary::from(day)));
    lines.push(String::new());

    let mut domains = day.domains.iter().collect::<Vec<_>>();
    domains.sort_by(|(_, a), (_, b)| b.cmp(a));
    for (domain, seconds) in domains {
        let category = ledger
            .domains
            .get(domain)
            .map(|record| painted(record.category))
            .unwrap_or_else(|| Colour::Fixed(8).paint("unknown").to_string());
        lines.push(format!(
            "{}\t{}\t{}\t{}",
            format_duration(*seconds),
            time_share(*seconds, day.total_time),
            category,
            domain
        ));
    }
    lines.join("\n")
}

pub fn render_overrides(overrides: &CategoryOverrides) -> String {
    if overrides.is_empty() {
        return "No category overrides".into();
    }
    overrides
        .iter()
        .map(|(domain, category)| format!("{}\t{domain}", painted(*category)))
        .collect::<Vec<_>>()
        .join("\n")
}
