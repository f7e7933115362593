mod sampler_tests;
mod support;
