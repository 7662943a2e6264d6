// templates/pages/home.rs

use crate::templates::{components::card, desktop_layout};
use maud::{html, Markup};

pub fn home_page(signed_in: Option<&str>) -> Markup {
    desktop_layout(
        "Home",
        signed_in,
        html! {
            main class="container" {
                h1 { "Canvass" }
                p class="lead" {
                    "Coordinate door-to-door fundraising: claim a floor, record each door, and see where to go next."
                }

                (card("For volunteers", html! {
                    p { "Claim the floor you are working so nobody doubles up. Record donations, callbacks and refusals as you go." }
                }))
                (card("For team leaders", html! {
                    p { "Import buildings from a spreadsheet, watch progress live, and export results when the drive is done." }
                }))

                @if signed_in.is_some() {
                    a href="/dashboard" class="button primary" { "Open your dashboard" }
                } @else {
                    a href="/login" class="button primary" { "Sign in" }
                }
            }
        },
    )
}
