use maud::{html, Markup};

/// Partial swapped in place of the login form by htmx.
pub fn check_email_content(email: &str) -> Markup {
    html! {
        div class="text-center py-8 px-4 fade-in" {
            h3 class="text-lg leading-6 font-medium text-gray-900" { "Check your email" }

            div class="mt-2" {
                p class="text-sm text-gray-500" {
                    "We sent a sign-in link to "
                    strong class="text-gray-900" { (email) }
                    "."
                }
                p class="text-sm text-gray-500 mt-2" {
                    "The link works once and expires soon."
                }
            }

            div class="mt-6" {
                a href="/login" class="text-sm font-medium text-blue-600 hover:text-blue-500" {
                    "Try with a different email"
                }
            }
        }
    }
}
