pub mod rasterizer;
