mod default;
mod keystone;
