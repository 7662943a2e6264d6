use std::collections::HashMap;

use crate::domain::campaign::{Business, Campaign, CampaignKind, Room};
use crate::domain::claims::{FloorState, FloorStatus};
use crate::domain::route::RoutePlan;
use crate::domain::stats::CampaignStats;
use crate::domain::status::VisitStatus;
use crate::templates::components::{money, progress_bar, status_badge, timestamp};
use crate::templates::desktop_layout;
use maud::{html, Markup};

pub struct CampaignVm {
    pub viewer_name: String,
    pub viewer_id: i64,
    pub is_leader: bool,
    pub campaign: Campaign,
    pub stats: CampaignStats,
    pub rooms: Vec<Room>,
    pub floors: Vec<FloorStatus>,
    pub route: Option<RoutePlan>,
    pub businesses: Vec<Business>,
    /// user id -> shown name, for claim holders.
    pub names: HashMap<i64, String>,
    pub tz_offset_minutes: i32,
}

pub fn campaign_page(vm: &CampaignVm) -> Markup {
    let c = &vm.campaign;
    desktop_layout(
        &c.name,
        Some(&vm.viewer_name),
        html! {
            main class="container" data-campaign=(c.id) {
                h1 { (c.name) }
                p class="totals" {
                    (vm.stats.visited) " of " (vm.stats.units) " visited · raised " strong { (money(vm.stats.raised_cents)) }
                    @if let Some(t) = c.target_cents { " of " (money(t)) }
                }
                (progress_bar(vm.stats.progress_pct))

                nav class="actions" {
                    a href=(format!("/campaigns/{}/report", c.id)) target="_blank" { "Printable report" }
                    " · "
                    a href=(format!("/campaigns/{}/export.csv", c.id)) { "CSV" }
                    " · "
                    a href=(format!("/campaigns/{}/export.xlsx", c.id)) { "Excel" }
                }

                @match c.kind {
                    CampaignKind::Residential => (building(vm)),
                    CampaignKind::Corporate => (business_list(vm)),
                }
            }
        },
    )
}

fn route_hint(plan: &RoutePlan) -> Markup {
    html! {
        section class="card route" id="route" {
            h3 { "Suggested route" }
            @if let Some(start) = &plan.start {
                p { "Start on floor " strong { (start.floor()) } }
            }
            @if !plan.skip.is_empty() {
                p class="skip" {
                    "Consider skipping floor"
                    @if plan.skip.len() > 1 { "s" }
                    " "
                    (plan.skip.iter().map(|f| f.to_string()).collect::<Vec<_>>().join(", "))
                    ": most doors there have said no."
                }
            }
        }
    }
}

fn floor_claim(vm: &CampaignVm, status: &FloorStatus) -> Markup {
    let claim_url = format!("/api/campaigns/{}/floors/{}/claim", vm.campaign.id, status.floor);
    html! {
        @match &status.state {
            FloorState::Claimed { claim_id, user_id, active: true, .. } => {
                @if *user_id == vm.viewer_id {
                    span class="claim mine" { "Your floor" }
                    button class="link" hx-delete=(format!("/api/claims/{claim_id}")) hx-swap="none" { "Release" }
                } @else {
                    span class="claim taken" {
                        "Claimed by " (vm.names.get(user_id).map(String::as_str).unwrap_or("another volunteer"))
                    }
                    @if vm.is_leader {
                        button class="link" hx-delete=(format!("/api/claims/{claim_id}")) hx-swap="none" { "Release" }
                    }
                }
            }
            _ => {
                button class="claim open" hx-post=(claim_url) hx-swap="none" { "Claim floor" }
            }
        }
    }
}

fn building(vm: &CampaignVm) -> Markup {
    html! {
        @if let Some(plan) = &vm.route {
            (route_hint(plan))
        }
        div class="floors" {
            @for status in &vm.floors {
                section class="floor" id=(format!("floor-{}", status.floor)) {
                    header {
                        h3 { "Floor " (status.floor) }
                        (floor_claim(vm, status))
                    }
                    div class="rooms" {
                        @for room in vm.rooms.iter().filter(|r| r.floor == status.floor) {
                            (room_tile(room, vm.tz_offset_minutes))
                        }
                    }
                }
            }
        }
    }
}

fn room_tile(room: &Room, tz: i32) -> Markup {
    html! {
        div class=(format!("room status-{}", room.status.as_str())) id=(format!("room-{}", room.id)) {
            strong { (room.label) }
            (status_badge(room.status, false))
            @if room.status == VisitStatus::Donated && room.donation_cents > 0 {
                span class="amount" { (money(room.donation_cents)) }
            }
            @if let Some(at) = room.callback_at {
                span class="callback" { "Back " (timestamp(at, tz)) }
            }
            @if let Some(note) = &room.note {
                p class="note" { (note) }
            }
        }
    }
}

fn business_list(vm: &CampaignVm) -> Markup {
    html! {
        section class="card" {
            h3 { "Businesses" }
            @if vm.businesses.is_empty() {
                p { "No businesses added yet." }
            } @else {
                table {
                    thead { tr { th { "Business" } th { "Contact" } th { "Status" } th { "Supports" } th { "Note" } } }
                    tbody {
                        @for b in &vm.businesses {
                            tr id=(format!("business-{}", b.id)) {
                                td { (b.name) }
                                td { (b.contact_name.as_deref().unwrap_or("")) }
                                td { (status_badge(b.status, true)) }
                                td { (b.supports) }
                                td { (b.note.as_deref().unwrap_or("")) }
                            }
                        }
                    }
                }
            }
        }
    }
}
