pub mod campaign;
pub mod check_email;
pub mod dashboard;
pub mod home;
pub mod login;
pub mod report;

pub use campaign::{campaign_page, CampaignVm};
pub use check_email::check_email_content;
pub use dashboard::{dashboard_page, DashboardVm, TeamCard};
pub use home::home_page;
pub use login::login_page;
pub use report::report_page;
