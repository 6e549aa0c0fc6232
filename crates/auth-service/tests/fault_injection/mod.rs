mod store_failure_tests;
