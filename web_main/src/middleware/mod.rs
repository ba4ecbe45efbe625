pub mod guard_middleware;
