//! Chart and stat-card projections
//!
//! Pure functions over analytics points and overview numbers, used by the
//! Overview and Analytics views.

use crate::models::{AnalyticsPoint, Overview, User};
use chrono::{DateTime, NaiveDate};
use serde::Serialize;

/// Bars shown in the overview chart
pub const OVERVIEW_CHART_DAYS: usize = 7;

/// Members shown in the overview "Users List" card
pub const TEAM_PREVIEW_LEN: usize = 4;

const PLACEHOLDER_TASKS: [(&str, &str); 4] = [
    ("Working on Github Project Repository", "Completed"),
    ("Working on Integrate User Authentication System", "In Progress"),
    ("Working on Develop Search and Filter Functionality", "Pending"),
    ("Working on Responsive Layout for Homepage", "In Progress"),
];

const FALLBACK_TASK: (&str, &str) = ("Working on tasks", "In Progress");

const DAY_LETTERS: [char; 7] = ['S', 'M', 'T', 'W', 'T', 'F', 'S'];

/// Overview chart bar drawn in the accent colour
const HIGHLIGHTED_BAR: usize = 3;

/// Last `n` points, oldest first
pub fn recent(points: &[AnalyticsPoint], n: usize) -> &[AnalyticsPoint] {
    &points[points.len().saturating_sub(n)..]
}

/// Largest `views` value, never below 1
pub fn max_views(points: &[AnalyticsPoint]) -> u64 {
    points.iter().map(|p| p.views).max().unwrap_or(0).max(1)
}

/// Bar height as a percentage of `max`, clamped to `0..=100`
pub fn bar_height(value: u64, max: u64) -> f64 {
    let pct = value as f64 / max.max(1) as f64 * 100.0;
    pct.clamp(0.0, 100.0)
}

/// One bar of the overview chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBar {
    pub label: char,
    pub height: f64,
    pub highlighted: bool,
}

/// Bars for the last seven days, scaled to the largest view count
pub fn overview_chart(points: &[AnalyticsPoint]) -> Vec<ChartBar> {
    let window = recent(points, OVERVIEW_CHART_DAYS);
    let max = max_views(window);
    window
        .iter()
        .enumerate()
        .map(|(i, p)| ChartBar {
            label: DAY_LETTERS[i % DAY_LETTERS.len()],
            height: bar_height(p.views, max),
            highlighted: i == HIGHLIGHTED_BAR,
        })
        .collect()
}

/// Paired views/clicks bar of the analytics chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficBar {
    /// Short weekday of the point's date, empty when the date is unreadable
    pub label: String,
    pub views_height: f64,
    /// Relative to max views so both bars share a scale
    pub clicks_height: f64,
}

pub fn traffic_chart(points: &[AnalyticsPoint]) -> Vec<TrafficBar> {
    let max = max_views(points);
    points
        .iter()
        .map(|p| TrafficBar {
            label: p.date.as_deref().and_then(weekday_label).unwrap_or_default(),
            views_height: bar_height(p.views, max),
            clicks_height: bar_height(p.clicks, max),
        })
        .collect()
}

fn weekday_label(raw: &str) -> Option<String> {
    let date = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()?;
    Some(date.format("%a").to_string())
}

/// Sums across all points
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub views: u64,
    pub clicks: u64,
    pub conversions: u64,
    /// `conversions / max(views, 1) * 100`
    pub conversion_rate: f64,
}

impl Totals {
    pub fn from_points(points: &[AnalyticsPoint]) -> Self {
        let views: u64 = points.iter().map(|p| p.views).sum();
        let clicks = points.iter().map(|p| p.clicks).sum();
        let conversions: u64 = points.iter().map(|p| p.conversions).sum();

        Self {
            views,
            clicks,
            conversions,
            conversion_rate: conversions as f64 / views.max(1) as f64 * 100.0,
        }
    }

    /// Conversion rate with one decimal, e.g. `"3.2%"`
    pub fn conversion_rate_display(&self) -> String {
        format!("{:.1}%", self.conversion_rate)
    }
}

/// Revenue in thousands, e.g. `45200.0` → `"$45k"`
pub fn format_revenue_k(revenue: f64) -> String {
    format!("${:.0}k", revenue / 1000.0)
}

/// Integer with thousands separators, e.g. `12345` → `"12,345"`
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// One stat card on the overview page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatCard {
    pub title: &'static str,
    pub value: String,
}

/// The four overview stat cards
pub fn stat_cards(overview: &Overview) -> Vec<StatCard> {
    vec![
        StatCard {
            title: "Total Users",
            value: format_count(overview.total_users),
        },
        StatCard {
            title: "Active Users",
            value: format_count(overview.active_users),
        },
        StatCard {
            title: "Revenue",
            value: format_revenue_k(overview.revenue),
        },
        StatCard {
            title: "Growth",
            value: format!("{}%", overview.growth),
        },
    ]
}

/// A user paired with the task shown next to them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamMember<'a> {
    pub user: &'a User,
    pub task: &'static str,
    pub status: &'static str,
}

/// First few users, each labelled with a placeholder task
pub fn team_preview(users: &[User]) -> Vec<TeamMember<'_>> {
    users
        .iter()
        .take(TEAM_PREVIEW_LEN)
        .enumerate()
        .map(|(i, user)| {
            let (task, status) = PLACEHOLDER_TASKS.get(i).copied().unwrap_or(FALLBACK_TASK);
            TeamMember { user, task, status }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(views: u64, clicks: u64, conversions: u64) -> AnalyticsPoint {
        AnalyticsPoint {
            date: None,
            views,
            clicks,
            conversions,
        }
    }

    #[test]
    fn test_recent_takes_tail() {
        let points: Vec<_> = (0..10).map(|i| point(i, 0, 0)).collect();
        let tail = recent(&points, OVERVIEW_CHART_DAYS);
        assert_eq!(tail.len(), 7);
        assert_eq!(tail[0].views, 3);
        assert_eq!(tail[6].views, 9);

        assert_eq!(recent(&points[..2], 7).len(), 2);
        assert!(recent(&[], 7).is_empty());
    }

    #[test]
    fn test_max_views_floors_at_one() {
        assert_eq!(max_views(&[]), 1);
        assert_eq!(max_views(&[point(0, 0, 0)]), 1);
        assert_eq!(max_views(&[point(40, 0, 0), point(120, 0, 0)]), 120);
    }

    #[test]
    fn test_bar_height() {
        assert_eq!(bar_height(50, 200), 25.0);
        assert_eq!(bar_height(0, 0), 0.0);
        // Clicks are drawn against max views and may exceed it
        assert_eq!(bar_height(300, 200), 100.0);
    }

    #[test]
    fn test_overview_chart() {
        let points: Vec<_> = (1..=9).map(|i| point(i * 10, 0, 0)).collect();
        let bars = overview_chart(&points);
        assert_eq!(bars.len(), 7);
        assert_eq!(bars[0].label, 'S');
        assert_eq!(bars[6].height, 100.0);
        assert!(bars[3].highlighted);
        assert_eq!(bars.iter().filter(|b| b.highlighted).count(), 1);
    }

    #[test]
    fn test_traffic_chart_labels() {
        let mut monday = point(200, 50, 0);
        monday.date = Some("2024-11-25".to_string());
        let mut unknown = point(100, 0, 0);
        unknown.date = Some("soon".to_string());

        let bars = traffic_chart(&[monday, unknown]);
        assert_eq!(bars[0].label, "Mon");
        assert_eq!(bars[0].clicks_height, 25.0);
        assert_eq!(bars[1].label, "");
        assert_eq!(bars[1].views_height, 50.0);
    }

    #[test]
    fn test_totals() {
        let totals = Totals::from_points(&[point(1000, 80, 20), point(600, 40, 12)]);
        assert_eq!(totals.views, 1600);
        assert_eq!(totals.clicks, 120);
        assert_eq!(totals.conversions, 32);
        assert_eq!(totals.conversion_rate_display(), "2.0%");

        let empty = Totals::from_points(&[]);
        assert_eq!(empty.conversion_rate, 0.0);
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format_revenue_k(45_200.0), "$45k");
        assert_eq!(format_revenue_k(999.0), "$1k");
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1,000");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    #[test]
    fn test_stat_cards() {
        let cards = stat_cards(&Overview {
            total_users: 12_450,
            active_users: 8_320,
            revenue: 45_200.0,
            growth: 12.5,
        });
        let values: Vec<&str> = cards.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["12,450", "8,320", "$45k", "12.5%"]);
    }

    #[test]
    fn test_team_preview() {
        let users: Vec<User> = (0..6)
            .map(|i| User {
                id: i.to_string(),
                name: format!("User {}", i),
                email: String::new(),
                status: "active".to_string(),
                join_date: None,
            })
            .collect();

        let team = team_preview(&users);
        assert_eq!(team.len(), TEAM_PREVIEW_LEN);
        assert_eq!(team[0].status, "Completed");
        assert_eq!(team[2].task, "Working on Develop Search and Filter Functionality");
        assert_eq!(team[3].user.name, "User 3");
    }
}
