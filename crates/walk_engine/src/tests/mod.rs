//! Scenario tests driving whole scenes through the frame callback

mod walking_scenarios;
