mod session_file;
