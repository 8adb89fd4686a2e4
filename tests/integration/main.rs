mod common;
mod gemini_test;
mod health_test;
