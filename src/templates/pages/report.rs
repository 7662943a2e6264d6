use crate::services::dashboard::CampaignReport;
use crate::templates::components::{money, timestamp};
use maud::{html, Markup, PreEscaped, DOCTYPE};

/// Self-contained printable page; the browser's print dialog opens on load.
pub fn report_page(report: &CampaignReport, generated_at: i64, tz_offset_minutes: i32) -> Markup {
    let c = &report.campaign;
    let s = &report.stats;
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { (c.name) " report" }
                style {
                    "body { font-family: system-ui, sans-serif; margin: 2rem; }
                     table { border-collapse: collapse; width: 100%; margin-bottom: 1.5rem; }
                     th, td { border: 1px solid #ccc; padding: 4px 8px; text-align: left; }
                     @media print { a { display: none; } }"
                }
            }
            body onload="window.print()" {
                h1 { (c.name) }
                p class="generated" { "Generated " (timestamp(generated_at, tz_offset_minutes)) }

                h2 { "Totals" }
                table class="totals" {
                    tr { th { "Units" } td { (s.units) } }
                    tr { th { "Visited" } td { (s.visited) " (" (s.coverage_pct()) "%)" } }
                    tr { th { "Donated" } td { (s.donated) } }
                    tr { th { "Not interested" } td { (s.refused) } }
                    tr { th { "Callbacks" } td { (s.callbacks) } }
                    tr { th { "Not home" } td { (s.not_home) } }
                    tr { th { "Raised" } td { (money(s.raised_cents)) } }
                    @if let Some(t) = s.target_cents {
                        tr { th { "Target" } td { (money(t)) " (" (s.progress_pct.unwrap_or(0)) "%)" } }
                    }
                }

                @if !report.floors.is_empty() {
                    h2 { "By floor" }
                    table class="floors" {
                        thead { tr { th { "Floor" } th { "Visited" } th { "Donated" } th { "Refused" } th { "Callbacks" } th { "Raised" } } }
                        tbody {
                            @for f in &report.floors {
                                tr {
                                    td { (f.floor) }
                                    td { (f.visited) " / " (f.units) }
                                    td { (f.donated) }
                                    td { (f.refused) }
                                    td { (f.callbacks) }
                                    td { (money(f.raised_cents)) }
                                }
                            }
                        }
                    }
                }

                @if !report.donations.is_empty() {
                    h2 { "Donations" }
                    table class="donations" {
                        thead { tr { th { "Unit" } th { "Amount" } th { "Note" } } }
                        tbody {
                            @for r in &report.donations {
                                tr {
                                    td { (r.label) }
                                    td { (money(r.donation_cents)) }
                                    td { (r.note.as_deref().unwrap_or("")) }
                                }
                            }
                        }
                    }
                }

                a href=(format!("/campaigns/{}", c.id)) { (PreEscaped("&larr;")) " Back" }
            }
        }
    }
}
