mod helpers;

mod recovery_test;
