pub mod ljud_sys;
