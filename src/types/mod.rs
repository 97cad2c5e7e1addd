pub mod airport;
pub mod city;
pub mod compass;
pub mod location;
pub mod observation;
