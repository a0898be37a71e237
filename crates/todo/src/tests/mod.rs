mod allocator_tests;
mod helpers;
