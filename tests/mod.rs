mod common;
mod mailjet_tests;
