mod common;
mod eligibility;
mod fitness;
