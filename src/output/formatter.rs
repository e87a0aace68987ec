use std::io::IsTerminal;
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

use crate::scoring::{CategoryScore, MetricScore, PrecomputedEntry, RankedEntity};
use crate::weights::{SliderSet, SLIDER_TOTAL};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a 0-10 score with two decimals ("7.42")
/// If incomplete is true, appends asterisk to indicate missing metrics
pub fn format_score(score: f64, incomplete: bool) -> String {
    if incomplete {
        format!("{:.2}*", score)
    } else {
        format!("{:.2}", score)
    }
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

fn fit_name(name: &str, fixed_width: usize, term_width: Option<usize>) -> String {
    match term_width {
        Some(width) if width > fixed_width + 10 => truncate_name(name, width - fixed_width),
        // Very narrow terminal
        Some(_) => truncate_name(name, 20),
        // No terminal (pipe), don't truncate
        None => name.to_string(),
    }
}

/// Format ranked entities as a table with columns: Rank, Score, Name, Id
/// No headers
/// Rank column: 3 chars (fits "99."), right-aligned
/// Score column is right-aligned, 6 chars wide (fits "10.00*")
pub fn format_ranked_table(ranked: &[RankedEntity], use_colors: bool) -> String {
    format_ranked_table_with_width(ranked, use_colors, get_terminal_width())
}

fn format_ranked_table_with_width(
    ranked: &[RankedEntity],
    use_colors: bool,
    term_width: Option<usize>,
) -> String {
    if ranked.is_empty() {
        return "No entities found.".to_string();
    }

    let rank_width = format!("{}.", ranked.len()).len().max(3);
    let score_width = 6;
    let separator = "  ";

    ranked
        .iter()
        .map(|item| {
            let rank_str = format!("{:>width$}", format!("{}.", item.rank), width = rank_width);
            let score_str = format_score(item.score, item.breakdown.incomplete());
            let score_padded = format!("{:>width$}", score_str, width = score_width);

            let id = &item.entity.id;
            let fixed_width = rank_width + 1 + score_width + separator.len() * 2 + id.len();
            let name = fit_name(&item.entity.name, fixed_width, term_width);

            if use_colors {
                format!(
                    "{} {}{}{}{}{}",
                    rank_str.dimmed(),
                    score_padded.bold(),
                    separator,
                    name,
                    separator,
                    id.dimmed()
                )
            } else {
                format!("{} {}{}{}{}{}", rank_str, score_padded, separator, name, separator, id)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format ranked entities as tab-separated values for scripting
/// Columns: rank, score, id, name, then one column per category (no headers, no colors)
pub fn format_tsv(ranked: &[RankedEntity]) -> String {
    ranked
        .iter()
        .map(|item| {
            let mut columns = vec![
                item.rank.to_string(),
                format!("{:.2}", item.score),
                item.entity.id.clone(),
                item.entity.name.clone(),
            ];
            columns.extend(item.breakdown.categories.iter().map(|c| format!("{:.2}", c.score)));
            columns.join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_metric_line(metric: &MetricScore, use_colors: bool) -> String {
    let unit = metric
        .unit
        .as_deref()
        .map(|u| format!(" {}", u))
        .unwrap_or_default();

    match (metric.raw_value, metric.score) {
        (Some(raw), Some(score)) => format!(
            "    {:<28} {:>8}{:<10} {:>5.1}  x{:.2}",
            metric.name,
            trim_float(raw),
            unit,
            score,
            metric.weight
        ),
        _ => {
            let line = format!("    {:<28} {:>8}", metric.name, "missing");
            if use_colors {
                line.yellow().to_string()
            } else {
                line
            }
        }
    }
}

fn format_category_block(category: &CategoryScore, use_colors: bool) -> String {
    let header = format!(
        "  {:<30} {:>5.2}  x{:.2}  = {:.2}",
        category.name, category.score, category.weight, category.weighted_score
    );
    let header = if use_colors {
        header.bold().to_string()
    } else {
        header
    };

    std::iter::once(header)
        .chain(category.metrics.iter().map(|m| format_metric_line(m, use_colors)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format one ranked entity with its per-category and per-metric breakdown
pub fn format_breakdown(item: &RankedEntity, use_colors: bool) -> String {
    let incomplete = item.breakdown.incomplete();
    let title = format!(
        "#{} {} ({})  {}",
        item.rank,
        item.entity.name,
        item.entity.id,
        format_score(item.score, incomplete)
    );
    let title = if use_colors {
        title.bold().to_string()
    } else {
        title
    };

    let mut lines = vec![title];
    lines.extend(
        item.breakdown
            .categories
            .iter()
            .map(|c| format_category_block(c, use_colors)),
    );
    if incomplete {
        lines.push("  * some metrics were missing and did not contribute".to_string());
    }
    lines.join("\n")
}

/// Format slider values one per line with a running total
/// Warns when the total is not 100%
pub fn format_sliders(sliders: &SliderSet, use_colors: bool) -> String {
    let id_width = sliders.iter().map(|s| s.id.len()).max().unwrap_or(0).max("total".len());

    let mut lines: Vec<String> = sliders
        .iter()
        .map(|s| format!("{:<width$}  {:>3}%", s.id, s.value, width = id_width))
        .collect();

    let total = sliders.total();
    let total_line = format!("{:<width$}  {:>3}%", "total", total, width = id_width);
    if total == SLIDER_TOTAL {
        lines.push(total_line);
    } else {
        let warning = format!("{}  (weights should sum to {}%)", total_line, SLIDER_TOTAL);
        lines.push(if use_colors {
            warning.red().to_string()
        } else {
            warning
        });
    }
    lines.join("\n")
}

/// Format recalculated precomputed rankings: Rank, Score, Name
pub fn format_recalculated(entries: &[PrecomputedEntry], use_colors: bool) -> String {
    if entries.is_empty() {
        return "No entities found.".to_string();
    }

    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let rank = entry.rank.unwrap_or(idx + 1);
            let rank_str = format!("{:>3}", format!("{}.", rank));
            let score_str = format!("{:>6}", format_score(entry.overall_score, false));
            if use_colors {
                format!("{} {}  {}", rank_str.dimmed(), score_str.bold(), entry.name)
            } else {
                format!("{} {}  {}", rank_str, score_str, entry.name)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// 12.0 -> "12", 4.25 -> "4.25"
fn trim_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{Entity, ScoreBreakdown};

    fn metric(name: &str, raw: Option<f64>) -> MetricScore {
        MetricScore {
            id: name.to_lowercase(),
            name: name.to_string(),
            raw_value: raw,
            normalized: raw.map(|_| 0.5),
            score: raw.map(|_| 5.0),
            weight: 1.0,
            unit: Some("min".to_string()),
        }
    }

    fn ranked(rank: usize, id: &str, name: &str, score: f64, missing: bool) -> RankedEntity {
        let category = CategoryScore {
            id: "access".to_string(),
            name: "Accessibility".to_string(),
            score,
            weight: 1.0,
            weighted_score: score,
            metrics: vec![
                metric("Time", Some(30.0)),
                metric("Airport", if missing { None } else { Some(45.0) }),
            ],
            missing: if missing { vec!["airport".to_string()] } else { vec![] },
        };
        RankedEntity {
            rank,
            score,
            breakdown: ScoreBreakdown {
                overall: score,
                categories: vec![category],
            },
            entity: Entity::new(id, name),
        }
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(7.4213, false), "7.42");
        assert_eq!(format_score(10.0, false), "10.00");
        assert_eq!(format_score(0.0, true), "0.00*");
    }

    #[test]
    fn test_truncate_name_short() {
        assert_eq!(truncate_name("Pattom", 20), "Pattom");
    }

    #[test]
    fn test_truncate_name_long() {
        assert_eq!(truncate_name("Sasthamangalam Junction", 15), "Sasthamangal...");
    }

    #[test]
    fn test_truncate_name_unicode() {
        assert_eq!(truncate_name("Café Mocha House", 10), "Café Mo...");
    }

    #[test]
    fn test_truncate_name_very_narrow() {
        assert_eq!(truncate_name("Kowdiar", 3), "Kow");
    }

    #[test]
    fn test_format_ranked_table_empty() {
        assert_eq!(format_ranked_table(&[], false), "No entities found.");
    }

    #[test]
    fn test_format_ranked_table_plain() {
        let items = vec![
            ranked(1, "kowdiar", "Kowdiar", 8.5, false),
            ranked(2, "pattom", "Pattom", 6.1, true),
        ];
        let result = format_ranked_table_with_width(&items, false, None);
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], " 1.   8.50  Kowdiar  kowdiar");
        assert_eq!(lines[1], " 2.  6.10*  Pattom  pattom");
    }

    #[test]
    fn test_format_ranked_table_truncates_to_terminal() {
        let items = vec![ranked(1, "x", "A very long locality name indeed", 5.0, false)];
        let result = format_ranked_table_with_width(&items, false, Some(40));
        assert!(result.contains("..."));
        assert!(result.chars().count() <= 40);
    }

    #[test]
    fn test_format_tsv() {
        let items = vec![ranked(1, "kowdiar", "Kowdiar", 8.5, false)];
        assert_eq!(format_tsv(&items), "1\t8.50\tkowdiar\tKowdiar\t8.50");
        assert_eq!(format_tsv(&[]), "");
    }

    #[test]
    fn test_format_breakdown_marks_missing() {
        let result = format_breakdown(&ranked(2, "pattom", "Pattom", 6.1, true), false);
        assert!(result.starts_with("#2 Pattom (pattom)  6.10*"));
        assert!(result.contains("Accessibility"));
        assert!(result.contains("30 min"));
        assert!(result.contains("missing"));
        assert!(result.contains("some metrics were missing"));
    }

    #[test]
    fn test_format_sliders() {
        let sliders = SliderSet::new(vec![("a".to_string(), 60), ("bb".to_string(), 40)]).unwrap();
        let result = format_sliders(&sliders, false);
        assert_eq!(result, "a       60%\nbb      40%\ntotal  100%");

        let unbalanced = SliderSet::new(vec![("a".to_string(), 60), ("b".to_string(), 30)]).unwrap();
        assert!(format_sliders(&unbalanced, false).contains("should sum to 100%"));
    }

    #[test]
    fn test_format_recalculated() {
        let mut entry = PrecomputedEntry::new("Kowdiar");
        entry.overall_score = 7.25;
        entry.rank = Some(1);
        assert_eq!(format_recalculated(&[entry], false), " 1.   7.25  Kowdiar");
    }
}
