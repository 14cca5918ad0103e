mod helpers;

mod concurrency_test;
mod repository_test;
