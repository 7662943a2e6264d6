use crate::domain::campaign::{Campaign, CampaignKind};
use crate::domain::stats::{CampaignStats, LeaderboardEntry};
use crate::domain::team::{Role, Team};
use crate::templates::components::{money, progress_bar};
use crate::templates::desktop_layout;
use maud::{html, Markup};

pub struct TeamCard {
    pub team: Team,
    pub role: Role,
    pub campaigns: Vec<(Campaign, CampaignStats)>,
    /// Leaders only.
    pub totals: Option<CampaignStats>,
    pub leaderboard: Vec<LeaderboardEntry>,
}

pub struct DashboardVm {
    pub name: String,
    pub email: String,
    pub teams: Vec<TeamCard>,
}

pub fn dashboard_page(vm: &DashboardVm) -> Markup {
    desktop_layout(
        "Dashboard",
        Some(&vm.name),
        html! {
            main class="container" {
                h1 { "Dashboard" }
                p { "Signed in as " strong { (vm.email) } }

                @if vm.teams.is_empty() {
                    section class="card" {
                        h3 { "No teams yet" }
                        p { "Ask a team leader to add " strong { (vm.email) } " to their team." }
                    }
                }

                @for card in &vm.teams {
                    (team_section(card))
                }
            }
        },
    )
}

fn team_section(card: &TeamCard) -> Markup {
    html! {
        section class="card" id=(format!("team-{}", card.team.id)) {
            h2 { (card.team.name) " " small class="role" { (card.role.as_str()) } }

            @if let Some(t) = &card.totals {
                p class="totals" {
                    "Raised " strong { (money(t.raised_cents)) }
                    @if let Some(target) = t.target_cents { " of " (money(target)) }
                    " · " (t.visited) " of " (t.units) " doors visited"
                }
                (progress_bar(t.progress_pct))
            }

            @if card.campaigns.is_empty() {
                p { "No campaigns yet." }
            } @else {
                table class="campaigns" {
                    thead {
                        tr {
                            th { "Campaign" }
                            th { "Visited" }
                            th { "Donated" }
                            th { "Callbacks" }
                            th { "Raised" }
                            th { "Progress" }
                        }
                    }
                    tbody {
                        @for (campaign, stats) in &card.campaigns {
                            tr {
                                td {
                                    a href=(format!("/campaigns/{}", campaign.id)) { (campaign.name) }
                                    @if campaign.kind == CampaignKind::Corporate { " " small { "(corporate)" } }
                                }
                                td { (stats.visited) " / " (stats.units) }
                                td { (stats.donated) }
                                td { (stats.callbacks) }
                                td { (money(stats.raised_cents)) }
                                td {
                                    @match stats.progress_pct {
                                        Some(p) => { (p) "%" },
                                        None => "n/a",
                                    }
                                }
                            }
                        }
                    }
                }
            }

            @if !card.leaderboard.is_empty() {
                h3 { "Volunteers" }
                ol class="leaderboard" {
                    @for entry in &card.leaderboard {
                        li {
                            (entry.name) ": " (entry.donations) " donations, "
                            (money(entry.raised_cents)) " from " (entry.visits) " visits"
                        }
                    }
                }
            }
        }
    }
}
