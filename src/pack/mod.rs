pub(crate) mod packer;
