mod server_instance;
