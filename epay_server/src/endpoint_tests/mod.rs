mod checksum;
mod helpers;
mod mocks;
mod payments;
mod ucrm_flow;
