pub mod commands;
pub mod html;
pub mod site;
