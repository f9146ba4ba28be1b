mod auth_flow;
mod helpers;
