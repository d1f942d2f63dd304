mod activity;
mod bmi;
mod coach;
mod data;
mod food;
mod gallery;
mod goals;
mod helpers;
mod theme;

pub(crate) use activity::{cmd_activity_grid, cmd_activity_list, cmd_activity_log, cmd_activity_show};
pub(crate) use bmi::{cmd_bmi_calc, cmd_bmi_photo, cmd_bmi_show};
pub(crate) use coach::cmd_coach;
pub(crate) use data::{cmd_export, cmd_import};
pub(crate) use food::{cmd_food_add, cmd_food_history, cmd_food_remove, cmd_food_show};
pub(crate) use gallery::cmd_gallery;
pub(crate) use goals::{cmd_goals_set, cmd_goals_show, cmd_goals_types};
pub(crate) use helpers::parse_date;
pub(crate) use theme::{cmd_theme_set, cmd_theme_show, cmd_theme_toggle};
