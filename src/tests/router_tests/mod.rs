mod auth_flow_tests;
mod campaign_tests;
mod claim_tests;
mod dashboard_tests;
mod recording_tests;
