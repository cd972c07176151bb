mod lifecycle;
mod flow_interaction;
