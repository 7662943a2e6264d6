use maud::{html, Markup, DOCTYPE};

/// Page shell. `signed_in` is the name shown in the header, if any.
pub fn desktop_layout(title: &str, signed_in: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " · Canvass" }
                link rel="icon" href="/static/favicon/favicon.ico";
                link rel="stylesheet" href="/static/main.css";
                script src="/static/htmx.js" defer {};
            }
            body {
                header class="flex items-center justify-between px-6 py-3 shadow" {
                    a href="/" class="brand" { "Canvass" }
                    nav {
                        ul {
                            @if signed_in.is_some() {
                                li { a href="/dashboard" { "Dashboard" } }
                            }
                        }
                    }
                    @match signed_in {
                        Some(name) => {
                            form method="post" action="/auth/logout" class="inline" {
                                span class="who" { (name) }
                                button type="submit" class="link" { "Sign out" }
                            }
                        }
                        None => {
                            a href="/login" class="text-base font-medium hover:text-blue-600" { "Sign in" }
                        }
                    }
                }
                (content)
            }
        }
    }
}
