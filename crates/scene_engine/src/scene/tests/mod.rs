//! Multi-module scenarios driving the scene graph end to end
