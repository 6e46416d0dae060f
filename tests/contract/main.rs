mod request_build;
