//! Built-in variable catalog.
//!
//! Every project starts from this catalog. Names are frozen once shipped
//! because stored stats records and chart formulas reference them by name.

use crate::models::{Variable, VariableFlags, VariableType};

/// The built-in catalog, in listing order.
///
/// Stored variables come first so the derived rate formulas at the end can
/// reference them during registration.
pub fn catalog() -> Vec<Variable> {
    vec![
        // Content pipeline, written by the capture platform.
        Variable::input(
            "remoteImages",
            "Captured images",
            VariableType::Count,
            "Content",
        )
        .with_flags(VariableFlags::manual()),
        Variable::input(
            "approvedImages",
            "Approved images",
            VariableType::Count,
            "Content",
        )
        .with_flags(VariableFlags::manual()),
        Variable::input(
            "rejectedImages",
            "Rejected images",
            VariableType::Count,
            "Content",
        )
        .with_flags(VariableFlags::manual()),
        Variable::input(
            "printedImages",
            "Printed images",
            VariableType::Count,
            "Content",
        )
        .with_flags(VariableFlags::manual()),
        Variable::input(
            "sharedImages",
            "Shared images",
            VariableType::Count,
            "Content",
        )
        .with_flags(VariableFlags::manual()),
        // Audience, tallied live at the event.
        Variable::input("attendance", "Attendance", VariableType::Count, "Audience")
            .with_flags(VariableFlags::clicker()),
        Variable::input("female", "Female visitors", VariableType::Count, "Audience")
            .with_flags(VariableFlags::clicker()),
        Variable::input("male", "Male visitors", VariableType::Count, "Audience")
            .with_flags(VariableFlags::clicker()),
        Variable::input("kids", "Kids", VariableType::Count, "Audience")
            .with_flags(VariableFlags::clicker()),
        // Engagement, tracked by the platform.
        Variable::input(
            "visitLinkClicks",
            "Visit link clicks",
            VariableType::Count,
            "Engagement",
        )
        .with_flags(VariableFlags::manual()),
        Variable::input("qrScans", "QR scans", VariableType::Count, "Engagement")
            .with_flags(VariableFlags::manual()),
        Variable::input(
            "emailsCollected",
            "Emails collected",
            VariableType::Count,
            "Engagement",
        )
        .with_flags(VariableFlags::manual()),
        Variable::input("optIns", "Marketing opt-ins", VariableType::Count, "Engagement")
            .with_flags(VariableFlags::manual()),
        // Commerce.
        Variable::input(
            "merchandiseSold",
            "Merchandise sold",
            VariableType::Count,
            "Commerce",
        )
        .with_flags(VariableFlags::clicker()),
        Variable::input(
            "merchandiseRevenue",
            "Merchandise revenue",
            VariableType::Currency,
            "Commerce",
        )
        .with_flags(VariableFlags::manual()),
        // Derived rates.
        Variable::derived(
            "approvalRate",
            "Approval rate",
            VariableType::Percentage,
            "Rates",
            "percentage(stats.approvedImages, stats.remoteImages)",
        ),
        Variable::derived(
            "printRate",
            "Print rate",
            VariableType::Percentage,
            "Rates",
            "percentage(stats.printedImages, stats.approvedImages)",
        ),
        Variable::derived(
            "shareRate",
            "Share rate",
            VariableType::Percentage,
            "Rates",
            "percentage(stats.sharedImages, stats.approvedImages)",
        ),
        Variable::derived(
            "femaleShare",
            "Female share",
            VariableType::Percentage,
            "Rates",
            "percentage(stats.female, stats.female + stats.male)",
        ),
        // Editorial text slots.
        Variable::text("eventSummary", "Event summary", "Notes")
            .with_flags(VariableFlags::manual()),
        Variable::text("highlightsTable", "Highlights table", "Notes")
            .with_flags(VariableFlags::manual()),
        Variable::text("coverImage", "Cover image", "Notes")
            .with_flags(VariableFlags::manual()),
    ]
}
